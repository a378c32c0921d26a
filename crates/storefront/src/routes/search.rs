//! Search-box suggestions.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use super::products::ProductView;
use crate::error::AppError;
use crate::state::AppState;

/// Search suggestions query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Search suggestions fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/search_suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub products: Vec<ProductView>,
}

/// Return the first few title matches as an HTML fragment.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<SuggestionsTemplate, AppError> {
    let products = state.catalog().suggest(&query.q).await?;

    Ok(SuggestionsTemplate {
        query: query.q.trim().to_owned(),
        products: products.iter().map(ProductView::from).collect(),
    })
}
