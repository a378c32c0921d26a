//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (newest products)
//!
//! # Catalog
//! GET  /products               - Listing (q, category, sort_by, dir, page)
//! GET  /products/{id}          - Product detail
//! GET  /search/suggest?q=      - Search-box suggestions (fragment)
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit (form: product_id)
//! POST /cart/increase          - Add one unit to a line
//! POST /cart/decrease          - Remove one unit from a line
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout and orders (requires auth)
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place order
//! GET  /orders                 - Order history
//! GET  /orders/{id}            - Order detail
//!
//! # Preferences
//! POST /preferences/theme      - Toggle light/dark theme
//! POST /preferences/locale     - Toggle English/Arabic
//!
//! # Assistant
//! GET  /assistant              - Shopping assistant page
//! POST /assistant              - Ask the assistant
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod assistant;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod preferences;
pub mod products;
pub mod search;
pub mod shell;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the preference toggle routes router.
pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route("/theme", post(preferences::toggle_theme))
        .route("/locale", post(preferences::toggle_locale))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .route("/search/suggest", get(search::suggest))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::page).post(checkout::submit))
        .nest("/orders", order_routes())
        .nest("/preferences", preference_routes())
        .route("/assistant", get(assistant::page).post(assistant::ask))
        .nest("/auth", auth_routes())
}

/// `return_to` if it is a path on this site, else `fallback`.
///
/// Browsers treat `\` like `/` and drop tabs and newlines, so `/\host` and
/// `/\t/host` are protocol-relative too.
pub(crate) fn local_path_or<'a>(return_to: Option<&'a str>, fallback: &'a str) -> &'a str {
    match return_to {
        Some(path) if is_local_path(path) => path,
        _ => fallback,
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !path.chars().any(char::is_control)
}
