//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use souq_core::OrderId;
use souq_core::order::Order;

use super::cart::CartLineView;
use super::shell::Shell;
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order display data for templates.
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    pub placed_at: String,
    pub status: &'static str,
    pub payment_method: &'static str,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let id = order.id.to_string();
        Self {
            short_id: id.chars().take(8).collect(),
            id,
            placed_at: order.created_at.format("%d %b %Y, %H:%M").to_string(),
            status: order.status.label(),
            payment_method: order.payment_method.label(),
            customer_name: order.customer_name.clone(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            lines: order.items.iter().map(CartLineView::from).collect(),
            item_count: order.item_count(),
            total: order.total_amount.display(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub shell: Shell,
    pub orders: Vec<OrderView>,
}

/// Order detail template. `order` is `None` when there is nothing to show.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub shell: Shell,
    pub order: Option<OrderView>,
}

/// List the signed-in user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersIndexTemplate, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let shell = Shell::load(&state, &session, Some(&user)).await;

    Ok(OrdersIndexTemplate {
        shell,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Show one order.
///
/// A malformed id, a missing order, and another user's order all render the
/// same inline "not found" page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let order = match id.parse::<OrderId>() {
        Ok(order_id) => OrderRepository::new(state.pool())
            .get_by_id(order_id)
            .await?
            .filter(|order| order.user_id == user.id),
        Err(_) => None,
    };
    let shell = Shell::load(&state, &session, Some(&user)).await;

    let status = if order.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        status,
        OrderShowTemplate {
            shell,
            order: order.as_ref().map(OrderView::from),
        },
    )
        .into_response())
}
