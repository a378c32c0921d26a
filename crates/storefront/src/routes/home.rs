//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::products::ProductView;
use super::shell::Shell;
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Number of products featured on the home page.
const NEWEST_COUNT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub newest: Vec<ProductView>,
    pub categories: Vec<String>,
}

/// Display the home page with the newest arrivals.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate, AppError> {
    let newest = state.catalog().newest(NEWEST_COUNT).await?;
    let categories = state.catalog().categories().await?;
    let shell = Shell::load(&state, &session, user.as_ref()).await;

    Ok(HomeTemplate {
        shell,
        newest: newest.iter().map(ProductView::from).collect(),
        categories,
    })
}
