//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::instrument;

use souq_core::order::CheckoutForm;

use super::cart::CartView;
use super::shell::{Shell, load_cart};
use crate::db::OrderRepository;
use crate::middleware::RequireAuth;
use crate::models::{Notification, notify};
use crate::services::{SubmitOrderError, submit_order};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub shell: Shell,
    pub cart: CartView,
    pub email: String,
}

/// Display the checkout form with an order summary.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> CheckoutTemplate {
    let cart = load_cart(&state, &session, Some(&user)).await;
    let shell = Shell::with_cart(&session, Some(&user), cart.state()).await;

    CheckoutTemplate {
        shell,
        cart: CartView::from(cart.state()),
        email: user.email.to_string(),
    }
}

/// Place the order.
///
/// Success redirects to the new order's page. Any failure queues a
/// notification and returns to the checkout form with the cart untouched.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Redirect {
    let mut cart = load_cart(&state, &session, Some(&user)).await;
    let orders = OrderRepository::new(state.pool());

    match submit_order(&orders, &mut cart, &user, &form).await {
        Ok(order) => {
            notify(&session, Notification::success("Thank you! Your order has been placed.")).await;
            Redirect::to(&format!("/orders/{}", order.id))
        }
        Err(e) => {
            if let SubmitOrderError::Store(ref err) = e {
                let event_id = sentry::capture_error(err);
                tracing::error!(error = %err, sentry_event_id = %event_id, "Order write failed");
            } else {
                tracing::info!(reason = %e, "Checkout rejected");
            }
            notify(&session, Notification::error(e.user_message())).await;
            Redirect::to("/checkout")
        }
    }
}
