//! Cart store and order submission against in-memory backends.

#![allow(clippy::unwrap_used)]

use souq_core::order::{CheckoutError, CheckoutForm};
use souq_core::{CartAction, Email, NewLineItem, PaymentMethod, Price, ProductId, UserId};
use souq_integration_tests::{MemoryCart, MemoryOrders};
use souq_storefront::models::CurrentUser;
use souq_storefront::services::{CartStore, SubmitOrderError, submit_order};

fn product(id: &str, minor: i64, stock: u32) -> NewLineItem {
    NewLineItem {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_minor(minor).unwrap(),
        stock,
        image: None,
    }
}

fn shopper() -> CurrentUser {
    CurrentUser {
        id: UserId::new(7),
        email: Email::parse("shopper@example.com").unwrap(),
    }
}

fn form(address: &str) -> CheckoutForm {
    CheckoutForm {
        customer_name: "Sam".to_owned(),
        address: address.to_owned(),
        phone: "+1 555 0100".to_owned(),
        payment_method: PaymentMethod::Cash,
    }
}

async fn filled_cart(backend: MemoryCart) -> CartStore<MemoryCart> {
    let mut cart = CartStore::load(backend).await;
    cart.dispatch(CartAction::Add(product("a", 5000, 10))).await;
    cart.dispatch(CartAction::Add(product("b", 3000, 10))).await;
    cart.dispatch(CartAction::Increase(ProductId::new("b"))).await;
    cart
}

#[tokio::test]
async fn test_cart_survives_reload() {
    let backend = MemoryCart::default();
    filled_cart(backend.clone()).await;

    let reloaded = CartStore::load(backend).await;
    assert_eq!(reloaded.state().items().len(), 2);
    assert_eq!(reloaded.state().item_count(), 3);
    assert_eq!(reloaded.state().total_amount(), Price::from_minor(11_000).unwrap());
}

#[tokio::test]
async fn test_removing_a_line_updates_total_and_backend() {
    let backend = MemoryCart::default();
    let mut cart = filled_cart(backend.clone()).await;

    let state = cart.dispatch(CartAction::Remove(ProductId::new("a"))).await;
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.total_amount(), Price::from_minor(6000).unwrap());

    let saved = backend.saved().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, ProductId::new("b"));
    assert_eq!(saved[0].quantity, 2);
}

#[tokio::test]
async fn test_failed_save_keeps_the_in_memory_cart() {
    let mut cart = CartStore::load(MemoryCart::failing()).await;

    let state = cart.dispatch(CartAction::Add(product("a", 1000, 1))).await;
    assert_eq!(state.item_count(), 1);
}

#[tokio::test]
async fn test_order_placed_and_cart_cleared() {
    let backend = MemoryCart::default();
    let mut cart = filled_cart(backend.clone()).await;
    let orders = MemoryOrders::default();

    let order = submit_order(&orders, &mut cart, &shopper(), &form("12 Harbour Road"))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_amount, Price::from_minor(11_000).unwrap());
    assert_eq!(order.user_email.as_deref(), Some("shopper@example.com"));
    assert_eq!(orders.written().len(), 1);

    assert!(cart.state().is_empty());
    assert_eq!(backend.saved(), Some(Vec::new()));
}

#[tokio::test]
async fn test_missing_address_writes_nothing() {
    let backend = MemoryCart::default();
    let mut cart = filled_cart(backend.clone()).await;
    let orders = MemoryOrders::default();

    let err = submit_order(&orders, &mut cart, &shopper(), &form("   "))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitOrderError::Validation(CheckoutError::InvalidField(_))
    ));
    assert!(!err.user_message().is_empty());
    assert!(orders.written().is_empty());
    assert_eq!(cart.state().item_count(), 3);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let mut cart = CartStore::load(MemoryCart::default()).await;
    let orders = MemoryOrders::default();

    let err = submit_order(&orders, &mut cart, &shopper(), &form("12 Harbour Road"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitOrderError::Validation(CheckoutError::EmptyCart)
    ));
    assert!(orders.written().is_empty());
}

#[tokio::test]
async fn test_over_stock_cart_is_refused() {
    let mut cart = CartStore::load(MemoryCart::default()).await;
    cart.dispatch(CartAction::Add(product("a", 1000, 1))).await;
    cart.dispatch(CartAction::Increase(ProductId::new("a"))).await;
    let orders = MemoryOrders::default();

    let err = submit_order(&orders, &mut cart, &shopper(), &form("12 Harbour Road"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitOrderError::Validation(CheckoutError::InsufficientStock(_))
    ));
    assert_eq!(cart.state().item_count(), 2);
}

#[tokio::test]
async fn test_store_failure_keeps_the_cart() {
    let backend = MemoryCart::default();
    let mut cart = filled_cart(backend.clone()).await;

    let err = submit_order(
        &MemoryOrders::refusing(),
        &mut cart,
        &shopper(),
        &form("12 Harbour Road"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SubmitOrderError::Store(_)));
    assert_eq!(cart.state().item_count(), 3);
    assert_eq!(backend.saved().unwrap().len(), 2);
}
