//! Checkout failures through the HTTP handlers.
//!
//! Sessions live in a `MemoryStore` so a shopper can be signed in without a
//! database. Order writes go to a pool that never connects, so every write
//! fails.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::post;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use souq_core::{CartState, Email, NewLineItem, Price, ProductId, UserId};
use souq_integration_tests::{lazy_pool, offline_config};
use souq_storefront::middleware::set_current_user;
use souq_storefront::models::{CurrentUser, session_keys};
use souq_storefront::routes;
use souq_storefront::state::AppState;

async fn sign_in(session: Session) -> StatusCode {
    let user = CurrentUser {
        id: UserId::new(7),
        email: Email::parse("shopper@example.com").unwrap(),
    };
    set_current_user(&session, &user).await.unwrap();
    StatusCode::NO_CONTENT
}

async fn fill_cart(session: Session) -> StatusCode {
    let mut cart = CartState::new();
    cart.add(NewLineItem {
        id: ProductId::new("tea"),
        title: "Green Tea".to_owned(),
        price: Price::from_minor(4000).unwrap(),
        stock: 3,
        image: None,
    });
    session
        .insert(session_keys::CART_ITEMS, cart.items())
        .await
        .unwrap();
    StatusCode::NO_CONTENT
}

/// A signed-in shopper with one item in the cart.
struct Shopper {
    app: Router,
    cookie: String,
}

impl Shopper {
    async fn new() -> Self {
        let config = offline_config();
        let pool = lazy_pool(&config).unwrap();
        let app = Router::new()
            .route("/test/sign-in", post(sign_in))
            .route("/test/fill-cart", post(fill_cart))
            .merge(routes::routes())
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
            .with_state(AppState::new(config, pool));

        let mut shopper = Self {
            app,
            cookie: String::new(),
        };
        shopper.send(Request::post("/test/sign-in")).await;
        shopper.send(Request::post("/test/fill-cart")).await;
        shopper
    }

    async fn send(&mut self, request: axum::http::request::Builder) -> Response {
        self.send_body(request, Body::empty()).await
    }

    async fn send_body(&mut self, request: axum::http::request::Builder, body: Body) -> Response {
        let request = if self.cookie.is_empty() {
            request
        } else {
            request.header(header::COOKIE, &self.cookie)
        };
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            pair.clone_into(&mut self.cookie);
        }
        response
    }

    async fn checkout(&mut self, form: &str) -> Response {
        let request = Request::post("/checkout")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send_body(request, Body::from(form.to_owned())).await
    }

    async fn page(&mut self, uri: &str) -> String {
        let response = self.send(Request::get(uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_blank_address_shows_notification_and_keeps_cart() {
    let mut shopper = Shopper::new().await;

    let response = shopper
        .checkout("customer_name=Sam&address=++&phone=0100&payment_method=cash")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout");

    let page = shopper.page("/checkout").await;
    assert!(page.contains("Please fill in your address and phone number."));
    assert!(page.contains("Green Tea"));

    // Notifications are shown once.
    let cart = shopper.page("/cart").await;
    assert!(!cart.contains("Please fill in your address"));
    assert!(cart.contains("Green Tea"));
}

#[tokio::test]
async fn test_failed_order_write_shows_notification_and_keeps_cart() {
    let mut shopper = Shopper::new().await;

    let response = shopper
        .checkout("customer_name=Sam&address=12+Harbour+Road&phone=0100&payment_method=card")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/checkout");

    let page = shopper.page("/checkout").await;
    assert!(page.contains("place your order"));
    assert!(page.contains("Green Tea"));
}
