//! Order persistence.
//!
//! Orders are written once at checkout and never updated here. Line items
//! are stored as a JSONB snapshot of the cart.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use souq_core::cart::CartLineItem;
use souq_core::order::{NewOrder, Order};
use souq_core::{OrderId, OrderStatus, PaymentMethod, Price, UserId};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, user_email, customer_name, phone, address, \
     payment_method, items, total_amount, status, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    user_email: Option<String>,
    customer_name: String,
    phone: String,
    address: String,
    payment_method: PaymentMethod,
    items: Json<Vec<CartLineItem>>,
    total_amount: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            customer_name: row.customer_name,
            phone: row.phone,
            address: row.address,
            payment_method: row.payment_method,
            items: row.items.0,
            total_amount: row.total_amount,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Clone)]
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write a new order with status `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO souq.orders
                (id, user_id, user_email, customer_name, phone, address,
                 payment_method, items, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(OrderId::generate())
        .bind(order.user_id)
        .bind(order.user_email.as_ref().map(|e| e.as_str().to_owned()))
        .bind(&order.customer_name)
        .bind(order.phone.as_str())
        .bind(order.address.as_str())
        .bind(order.payment_method)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(OrderStatus::Pending)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Fetch an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM souq.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// All orders placed by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM souq.orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM souq.orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}
