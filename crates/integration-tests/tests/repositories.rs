//! `PostgreSQL` repository tests.
//!
//! These need a reachable database in `STOREFRONT_DATABASE_URL` (or
//! `DATABASE_URL`). Migrations are applied before each test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tower_sessions::{MemoryStore, Session};

use souq_core::catalog::Product;
use souq_core::order::NewOrder;
use souq_core::{
    CartAction, CartState, Email, OrderId, OrderStatus, PaymentMethod, PhoneNumber, Price,
    ProductId, ShippingAddress,
};
use souq_storefront::db::{
    self, CartRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
};
use souq_storefront::models::CurrentUser;
use souq_storefront::services::{CartPersistence, SessionCartStorage};

async fn pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    db::migrate(&pool).await.unwrap();
    pool
}

/// An email address no earlier run has used.
fn fresh_email() -> Email {
    Email::parse(&format!("{}@example.com", OrderId::generate())).unwrap()
}

fn product(id: &str, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Test product {id}"),
        description: String::new(),
        price: Price::from_minor(2500).unwrap(),
        stock,
        category_id: Some("test".to_owned()),
        image: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_duplicate_email_is_a_conflict() {
    let pool = pool().await;
    let users = UserRepository::new(&pool);
    let email = fresh_email();

    users.create_with_password(&email, "hash").await.unwrap();
    let err = users.create_with_password(&email, "hash").await.unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_password_hash_lookup() {
    let pool = pool().await;
    let users = UserRepository::new(&pool);
    let email = fresh_email();

    let created = users.create_with_password(&email, "stored-hash").await.unwrap();
    let (user, hash) = users.get_password_hash(&email).await.unwrap().unwrap();

    assert_eq!(user.id, created.id);
    assert_eq!(hash, "stored-hash");
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_product_upsert_updates_stock() {
    let pool = pool().await;
    let products = ProductRepository::new(&pool);
    let id = format!("it-{}", OrderId::generate());

    products.upsert(&product(&id, 5)).await.unwrap();
    products.upsert(&product(&id, 2)).await.unwrap();

    let stored = products.get_by_id(&ProductId::new(&id)).await.unwrap().unwrap();
    assert_eq!(stored.stock, 2);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_order_round_trip_and_history() {
    let pool = pool().await;
    let email = fresh_email();
    let user = UserRepository::new(&pool)
        .create_with_password(&email, "hash")
        .await
        .unwrap();

    let mut cart = CartState::new();
    cart.reduce(CartAction::Add(product("it-order", 10).to_line_item()));
    cart.reduce(CartAction::Increase(ProductId::new("it-order")));

    let orders = OrderRepository::new(&pool);
    let new_order = NewOrder {
        user_id: user.id,
        user_email: Some(email),
        customer_name: "Sam".to_owned(),
        phone: PhoneNumber::parse("+1 555 0100").unwrap(),
        address: ShippingAddress::parse("12 Harbour Road").unwrap(),
        payment_method: PaymentMethod::Card,
        items: cart.items().to_vec(),
        total_amount: cart.total_amount(),
    };

    let created = orders.create(&new_order).await.unwrap();
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.total_amount, Price::from_minor(5000).unwrap());

    let fetched = orders.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.items, new_order.items);
    assert_eq!(fetched.payment_method, PaymentMethod::Card);

    let history = orders.list_for_user(user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, created.id);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_cart_mirror_save_and_clear() {
    let pool = pool().await;
    let user = UserRepository::new(&pool)
        .create_with_password(&fresh_email(), "hash")
        .await
        .unwrap();
    let carts = CartRepository::new(&pool);

    assert_eq!(carts.get(user.id).await.unwrap(), None);

    let mut cart = CartState::new();
    cart.reduce(CartAction::Add(product("it-cart", 3).to_line_item()));
    carts.save(user.id, cart.items()).await.unwrap();
    assert_eq!(carts.get(user.id).await.unwrap(), Some(cart.items().to_vec()));

    carts.clear_items(user.id).await.unwrap();
    assert_eq!(carts.get(user.id).await.unwrap(), None);
}

fn fresh_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_session_storage_falls_back_to_mirror() {
    let pool = pool().await;
    let email = fresh_email();
    let user = UserRepository::new(&pool)
        .create_with_password(&email, "hash")
        .await
        .unwrap();
    let current = CurrentUser { id: user.id, email };

    let mut cart = CartState::new();
    cart.reduce(CartAction::Add(product("it-mirror", 4).to_line_item()));
    CartRepository::new(&pool)
        .save(user.id, cart.items())
        .await
        .unwrap();

    let storage = SessionCartStorage::new(fresh_session(), &pool, Some(&current));
    assert_eq!(storage.load().await.unwrap(), cart.items());

    let guest = SessionCartStorage::new(fresh_session(), &pool, None);
    assert!(guest.load().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn test_session_storage_clears_mirror_on_empty_cart() {
    let pool = pool().await;
    let email = fresh_email();
    let user = UserRepository::new(&pool)
        .create_with_password(&email, "hash")
        .await
        .unwrap();
    let current = CurrentUser { id: user.id, email };
    let carts = CartRepository::new(&pool);
    let session = fresh_session();
    let storage = SessionCartStorage::new(session.clone(), &pool, Some(&current));

    let mut cart = CartState::new();
    cart.reduce(CartAction::Add(product("it-clear", 4).to_line_item()));
    storage.save(cart.items()).await.unwrap();
    assert_eq!(carts.get(user.id).await.unwrap(), Some(cart.items().to_vec()));

    storage.save(&[]).await.unwrap();
    assert_eq!(carts.get(user.id).await.unwrap(), None);
    assert_eq!(storage.load().await.unwrap(), Vec::new());
}
