//! Cart route handlers.
//!
//! Each mutation loads the session's cart, applies one action, persists it,
//! and redirects back (post/redirect/get). Adding from a listing via HTMX
//! gets the badge fragment instead of a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use souq_core::ProductId;
use souq_core::cart::{CartAction, CartLineItem, CartState};

use super::local_path_or;
use super::shell::{Shell, load_cart};
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::models::{Notification, notify};
use crate::state::AppState;

/// Cart line display data for templates.
pub struct CartLineView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub quantity: u32,
    pub stock: u32,
    pub line_total: String,
    pub image: Option<String>,
    pub over_stock: bool,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.to_string(),
            title: line.title.clone(),
            price: line.price.display(),
            quantity: line.quantity,
            stock: line.stock,
            line_total: line.line_total().display(),
            image: line.image.clone(),
            over_stock: line.exceeds_stock(),
        }
    }
}

/// Cart display data for templates.
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            total: cart.total_amount().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Form naming the product a cart action applies to.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: String,
    /// Page to return to after adding; must be a local path.
    pub return_to: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub shell: Shell,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Only follow redirects to local paths.
fn safe_return_path(return_to: Option<&str>) -> &str {
    local_path_or(return_to, "/cart")
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> CartShowTemplate {
    let cart = load_cart(&state, &session, user.as_ref()).await;
    let shell = Shell::with_cart(&session, user.as_ref(), cart.state()).await;

    CartShowTemplate {
        shell,
        cart: CartView::from(cart.state()),
    }
}

/// Add one unit of a product to the cart.
///
/// The line snapshot (title, price, stock) comes from the catalog, never
/// from the form.
#[instrument(skip(state, session, user, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    let back = safe_return_path(form.return_to.as_deref()).to_owned();
    let id = ProductId::new(form.product_id);

    let Some(product) = state.catalog().get(&id).await? else {
        notify(&session, Notification::error("That product is no longer available.")).await;
        return Ok(Redirect::to(&back).into_response());
    };

    let mut cart = load_cart(&state, &session, user.as_ref()).await;
    let count = cart
        .dispatch(CartAction::Add(product.to_line_item()))
        .await
        .item_count();

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count },
        )
            .into_response());
    }

    notify(
        &session,
        Notification::success(format!("Added {} to your cart.", product.title)),
    )
    .await;
    Ok(Redirect::to(&back).into_response())
}

async fn apply(
    state: &AppState,
    session: &Session,
    user: Option<&crate::models::CurrentUser>,
    action: CartAction,
) -> Redirect {
    let mut cart = load_cart(state, session, user).await;
    cart.dispatch(action).await;
    Redirect::to("/cart")
}

/// Add one unit to an existing line.
#[instrument(skip(state, session, user))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let action = CartAction::Increase(ProductId::new(form.product_id));
    apply(&state, &session, user.as_ref(), action).await
}

/// Take one unit off a line, dropping it at zero.
#[instrument(skip(state, session, user))]
pub async fn decrease(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let action = CartAction::Decrease(ProductId::new(form.product_id));
    apply(&state, &session, user.as_ref(), action).await
}

/// Drop a line entirely.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let action = CartAction::Remove(ProductId::new(form.product_id));
    apply(&state, &session, user.as_ref(), action).await
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Redirect {
    apply(&state, &session, user.as_ref(), CartAction::Clear).await
}

/// Cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> CartCountTemplate {
    let cart = load_cart(&state, &session, user.as_ref()).await;
    CartCountTemplate {
        count: cart.state().item_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_must_be_local() {
        assert_eq!(safe_return_path(Some("/products?page=2")), "/products?page=2");
        assert_eq!(safe_return_path(Some("//evil.test/")), "/cart");
        assert_eq!(safe_return_path(Some("/\\evil.test/")), "/cart");
        assert_eq!(safe_return_path(Some("/\t/evil.test/")), "/cart");
        assert_eq!(safe_return_path(Some("https://evil.test/")), "/cart");
        assert_eq!(safe_return_path(None), "/cart");
    }
}
