//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use souq_core::ProductId;
use souq_core::catalog::{Product, ProductPage, ProductQuery, SortDirection, SortField};

use super::shell::Shell;
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            stock: product.stock,
            in_stock: product.in_stock(),
            image: product.image.clone(),
            category: product.category_id.clone(),
        }
    }
}

/// Category filter option.
pub struct CategoryOption {
    pub value: String,
    pub selected: bool,
}

/// Listing query parameters.
///
/// Everything is optional and parsed leniently; bad values fall back to
/// the defaults rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

impl ListingParams {
    fn to_query(&self) -> ProductQuery {
        ProductQuery {
            text: self.q.clone(),
            category: self.category.clone(),
            sort: self.sort_by.as_deref().map(SortField::parse).unwrap_or_default(),
            direction: self
                .dir
                .as_deref()
                .map(SortDirection::parse)
                .unwrap_or_default(),
            page: self
                .page
                .as_deref()
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(1),
        }
    }
}

/// Build a `/products` URL for `query` with the page and direction overridden.
fn listing_url(query: &ProductQuery, page: usize, direction: SortDirection) -> String {
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    let text = query.text.trim();
    if !text.is_empty() {
        params.append_pair("q", text);
    }
    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        params.append_pair("category", category);
    }
    params.append_pair("sort_by", query.sort.as_str());
    params.append_pair("dir", direction.as_str());
    params.append_pair("page", &page.to_string());
    format!("/products?{}", params.finish())
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub shell: Shell,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryOption>,
    pub query_text: String,
    pub sort_by: &'static str,
    pub dir: &'static str,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub toggle_dir_url: String,
}

impl ProductsIndexTemplate {
    fn new(shell: Shell, query: &ProductQuery, page: ProductPage, categories: Vec<String>) -> Self {
        let selected = query.category.as_deref().unwrap_or("all");
        Self {
            shell: shell.searching(&query.text),
            products: page.products.iter().map(ProductView::from).collect(),
            categories: categories
                .into_iter()
                .map(|value| CategoryOption {
                    selected: value == selected,
                    value,
                })
                .collect(),
            query_text: query.text.clone(),
            sort_by: query.sort.as_str(),
            dir: query.direction.as_str(),
            current_page: page.page,
            total_pages: page.total_pages,
            total_matches: page.total_matches,
            prev_url: page
                .has_prev()
                .then(|| listing_url(query, page.page - 1, query.direction)),
            next_url: page
                .has_next()
                .then(|| listing_url(query, page.page + 1, query.direction)),
            toggle_dir_url: listing_url(query, 1, query.direction.flipped()),
        }
    }
}

/// Product detail page template. `product` is `None` for an unknown id.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub shell: Shell,
    pub product: Option<ProductView>,
    pub in_cart: u32,
}

/// Display product listing page.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<ListingParams>,
) -> Result<ProductsIndexTemplate, AppError> {
    let query = params.to_query();
    let page = state.catalog().list(&query).await?;
    let categories = state.catalog().categories().await?;
    let shell = Shell::load(&state, &session, user.as_ref()).await;

    Ok(ProductsIndexTemplate::new(shell, &query, page, categories))
}

/// Display product detail page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let product = state.catalog().get(&id).await?;

    let cart = super::shell::load_cart(&state, &session, user.as_ref()).await;
    let in_cart = cart.state().get(&id).map_or(0, |line| line.quantity);
    let shell = Shell::with_cart(&session, user.as_ref(), cart.state()).await;

    let status = if product.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        status,
        ProductShowTemplate {
            shell,
            product: product.as_ref().map(ProductView::from),
            in_cart,
        },
    )
        .into_response())
}
