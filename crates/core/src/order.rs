//! Orders and checkout validation.
//!
//! An order is a one-shot snapshot of the cart plus the customer's delivery
//! details. Validation happens before anything is written: the caller turns
//! the raw checkout form into [`CheckoutDetails`] with [`validate_checkout`],
//! then builds a [`NewOrder`] from the details and the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineItem, CartState, StockShortfall};
use crate::types::{
    ContactFieldError, Email, OrderId, OrderStatus, PaymentMethod, PhoneNumber, Price,
    ShippingAddress, UserId,
};

/// Reasons a checkout is refused before the order is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// Address or phone is blank.
    #[error(transparent)]
    InvalidField(#[from] ContactFieldError),

    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Some lines ask for more units than were last known in stock.
    #[error("insufficient stock for {} item(s)", .0.len())]
    InsufficientStock(Vec<StockShortfall>),
}

impl CheckoutError {
    /// Message suitable for a customer-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidField(_) => "Please fill in your address and phone number.".to_owned(),
            Self::EmptyCart => "Your cart is empty.".to_owned(),
            Self::InsufficientStock(shortfalls) => {
                let names: Vec<String> = shortfalls
                    .iter()
                    .map(|s| format!("{} (only {} left)", s.title, s.available))
                    .collect();
                format!("Not enough stock for: {}.", names.join(", "))
            }
        }
    }
}

/// Raw checkout form fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Checkout fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub address: ShippingAddress,
    pub phone: PhoneNumber,
    pub payment_method: PaymentMethod,
}

/// Validate a checkout attempt against the current cart.
///
/// Checks run in a fixed order: address, phone, cart not empty, stock. The
/// stock check uses the stock recorded on each line when it was added and
/// is advisory only; nothing is reserved.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`].
pub fn validate_checkout(
    form: &CheckoutForm,
    cart: &CartState,
) -> Result<CheckoutDetails, CheckoutError> {
    let address = ShippingAddress::parse(&form.address)?;
    let phone = PhoneNumber::parse(&form.phone)?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let shortfalls = cart.stock_shortfalls();
    if !shortfalls.is_empty() {
        return Err(CheckoutError::InsufficientStock(shortfalls));
    }

    Ok(CheckoutDetails {
        customer_name: form.customer_name.trim().to_owned(),
        address,
        phone,
        payment_method: form.payment_method,
    })
}

/// An order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub user_email: Option<Email>,
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Copy of the cart lines at submission time.
    pub items: Vec<CartLineItem>,
    pub total_amount: Price,
}

impl NewOrder {
    /// Snapshot `cart` into a new order for `user_id`.
    #[must_use]
    pub fn from_cart(
        user_id: UserId,
        user_email: Option<Email>,
        details: CheckoutDetails,
        cart: &CartState,
    ) -> Self {
        Self {
            user_id,
            user_email,
            customer_name: details.customer_name,
            phone: details.phone,
            address: details.address,
            payment_method: details.payment_method,
            items: cart.items().to_vec(),
            total_amount: cart.total_amount(),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_email: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CartLineItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }
}
