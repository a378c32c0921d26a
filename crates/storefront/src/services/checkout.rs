//! Order submission.

use std::future::Future;

use thiserror::Error;
use tracing::{info, instrument};

use souq_core::cart::CartAction;
use souq_core::order::{CheckoutError, CheckoutForm, NewOrder, Order, validate_checkout};

use super::cart::{CartPersistence, CartStore};
use crate::db::{OrderRepository, RepositoryError};
use crate::models::CurrentUser;

/// Something that can store a new order.
pub trait OrderWriter: Send + Sync {
    /// Write `order` with status `Pending` and return the stored record.
    fn create_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

impl OrderWriter for OrderRepository<'_> {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.create(order).await
    }
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum SubmitOrderError {
    /// The form or cart failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] CheckoutError),

    /// The order could not be written.
    #[error("failed to store order: {0}")]
    Store(#[from] RepositoryError),
}

impl SubmitOrderError {
    /// Message suitable for a customer-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::Store(_) => "We couldn't place your order. Please try again.".to_owned(),
        }
    }
}

/// Validate the checkout, write the order, then clear the cart.
///
/// The cart is only cleared once the order is stored. On any error the cart
/// is left exactly as it was.
///
/// # Errors
///
/// Returns `SubmitOrderError::Validation` if the form or cart is invalid, or
/// `SubmitOrderError::Store` if the order write fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit_order<W, P>(
    writer: &W,
    cart: &mut CartStore<P>,
    user: &CurrentUser,
    form: &CheckoutForm,
) -> Result<Order, SubmitOrderError>
where
    W: OrderWriter,
    P: CartPersistence,
{
    let details = validate_checkout(form, cart.state())?;
    let new_order = NewOrder::from_cart(user.id, Some(user.email.clone()), details, cart.state());

    let order = writer.create_order(&new_order).await?;
    info!(order_id = %order.id, total = %order.total_amount, "Order placed");

    cart.dispatch(CartAction::Clear).await;

    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use souq_core::cart::NewLineItem;
    use souq_core::{Email, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

    use super::*;
    use crate::services::cart::testing::MemoryCart;

    struct Writer {
        fail: bool,
        written: Mutex<Vec<NewOrder>>,
    }

    impl Writer {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                written: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderWriter for Writer {
        async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::DataCorruption("write refused".to_owned()));
            }
            self.written.lock().unwrap().push(order.clone());
            Ok(Order {
                id: OrderId::generate(),
                user_id: order.user_id,
                user_email: order.user_email.as_ref().map(|e| e.as_str().to_owned()),
                customer_name: order.customer_name.clone(),
                phone: order.phone.as_str().to_owned(),
                address: order.address.as_str().to_owned(),
                payment_method: order.payment_method,
                items: order.items.clone(),
                total_amount: order.total_amount,
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            })
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("amira@souq.test").unwrap(),
        }
    }

    fn form(address: &str) -> CheckoutForm {
        CheckoutForm {
            customer_name: "Amira".to_owned(),
            address: address.to_owned(),
            phone: "01001234567".to_owned(),
            payment_method: PaymentMethod::Card,
        }
    }

    async fn cart_with_one_item(backend: MemoryCart) -> CartStore<MemoryCart> {
        let mut cart = CartStore::load(backend).await;
        cart.dispatch(CartAction::Add(NewLineItem {
            id: ProductId::new("tea"),
            title: "Green Tea".to_owned(),
            price: Price::from_minor(4_000).unwrap(),
            stock: 3,
            image: None,
        }))
        .await;
        cart
    }

    #[tokio::test]
    async fn test_success_writes_order_and_clears_cart() {
        let backend = MemoryCart::default();
        let mut cart = cart_with_one_item(backend.clone()).await;
        let writer = Writer::new(false);

        let order = submit_order(&writer, &mut cart, &user(), &form("12 Nile St"))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.user_email.as_deref(), Some("amira@souq.test"));
        assert!(cart.state().is_empty());
        assert_eq!(backend.saved(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_empty_address_blocks_and_keeps_cart() {
        let backend = MemoryCart::default();
        let mut cart = cart_with_one_item(backend).await;
        let before = cart.state().clone();
        let writer = Writer::new(false);

        let err = submit_order(&writer, &mut cart, &user(), &form("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitOrderError::Validation(_)));
        assert!(!err.user_message().is_empty());
        assert_eq!(cart.state(), &before);
        assert!(writer.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_cart() {
        let backend = MemoryCart::default();
        let mut cart = cart_with_one_item(backend.clone()).await;
        let before = cart.state().clone();

        let err = submit_order(&Writer::new(true), &mut cart, &user(), &form("12 Nile St"))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitOrderError::Store(_)));
        assert_eq!(cart.state(), &before);
        assert_eq!(backend.saved().unwrap().len(), 1);
    }
}
