//! Cart store: owns a shopper's [`CartState`] for one request and persists
//! it after every transition.
//!
//! The reducer in `souq_core::cart` is pure. [`CartStore`] wraps it with a
//! [`CartPersistence`] backend and writes the new item list after each
//! action. Persistence is best-effort: a failed write is logged and the
//! in-memory transition still stands.

use std::future::Future;

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, warn};

use souq_core::cart::{CartAction, CartLineItem, CartState};
use souq_core::UserId;

use crate::db::{CartRepository, RepositoryError};
use crate::models::{CurrentUser, session_keys};

/// Errors from a cart persistence backend.
#[derive(Debug, Error)]
pub enum CartPersistenceError {
    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Reading or writing the server-side mirror failed.
    #[error("cart mirror error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Where a cart's item list is kept between requests.
pub trait CartPersistence: Send + Sync {
    /// Read the last saved item list. An absent cart is an empty list.
    fn load(&self) -> impl Future<Output = Result<Vec<CartLineItem>, CartPersistenceError>> + Send;

    /// Replace the saved item list.
    fn save(
        &self,
        items: &[CartLineItem],
    ) -> impl Future<Output = Result<(), CartPersistenceError>> + Send;
}

/// Cart state plus the backend it is persisted to.
pub struct CartStore<P> {
    state: CartState,
    persistence: P,
}

impl<P: CartPersistence> CartStore<P> {
    /// Load the saved cart. A load failure starts from an empty cart.
    pub async fn load(persistence: P) -> Self {
        let state = match persistence.load().await {
            Ok(items) => CartState::from_items(items),
            Err(e) => {
                warn!(error = %e, "Failed to load cart, starting empty");
                CartState::new()
            }
        };

        Self { state, persistence }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Apply `action`, then persist the resulting item list.
    pub async fn dispatch(&mut self, action: CartAction) -> &CartState {
        debug!(?action, "Applying cart action");
        self.state.reduce(action);

        if let Err(e) = self.persistence.save(self.state.items()).await {
            warn!(error = %e, "Failed to persist cart");
        }

        &self.state
    }
}

/// Persists the cart in the session under `cart_items`, and mirrors it to
/// `souq.carts` for signed-in users.
///
/// A session with no saved cart falls back to the mirror, so a returning
/// user gets their cart back on a fresh session.
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
    mirror: Option<(PgPool, UserId)>,
}

impl SessionCartStorage {
    /// Session-only storage for a guest, mirrored storage for a signed-in user.
    #[must_use]
    pub fn new(session: Session, pool: &PgPool, user: Option<&CurrentUser>) -> Self {
        Self {
            session,
            mirror: user.map(|u| (pool.clone(), u.id)),
        }
    }
}

impl CartPersistence for SessionCartStorage {
    async fn load(&self) -> Result<Vec<CartLineItem>, CartPersistenceError> {
        if let Some(items) = self
            .session
            .get::<Vec<CartLineItem>>(session_keys::CART_ITEMS)
            .await?
        {
            return Ok(items);
        }

        match &self.mirror {
            Some((pool, user_id)) => Ok(CartRepository::new(pool)
                .get(*user_id)
                .await?
                .unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, items: &[CartLineItem]) -> Result<(), CartPersistenceError> {
        self.session.insert(session_keys::CART_ITEMS, items).await?;

        if let Some((pool, user_id)) = &self.mirror {
            let carts = CartRepository::new(pool);
            if items.is_empty() {
                carts.clear_items(*user_id).await?;
            } else {
                carts.save(*user_id, items).await?;
            }
        }

        Ok(())
    }
}

/// In-memory backend for unit tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::{CartLineItem, CartPersistence, CartPersistenceError};
    use crate::db::RepositoryError;

    /// Keeps the last saved list and counts saves. With `fail` set, every
    /// load and save errors.
    #[derive(Clone, Default)]
    pub struct MemoryCart {
        saved: Arc<Mutex<Option<Vec<CartLineItem>>>>,
        saves: Arc<Mutex<u32>>,
        fail: bool,
    }

    impl MemoryCart {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn saved(&self) -> Option<Vec<CartLineItem>> {
            self.saved.lock().unwrap().clone()
        }

        pub fn saves(&self) -> u32 {
            *self.saves.lock().unwrap()
        }
    }

    impl CartPersistence for MemoryCart {
        async fn load(&self) -> Result<Vec<CartLineItem>, CartPersistenceError> {
            if self.fail {
                return Err(RepositoryError::NotFound.into());
            }
            Ok(self.saved().unwrap_or_default())
        }

        async fn save(&self, items: &[CartLineItem]) -> Result<(), CartPersistenceError> {
            *self.saves.lock().unwrap() += 1;
            if self.fail {
                return Err(RepositoryError::DataCorruption("disk full".to_owned()).into());
            }
            *self.saved.lock().unwrap() = Some(items.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use souq_core::cart::NewLineItem;
    use souq_core::{Price, ProductId};

    use super::testing::MemoryCart;
    use super::*;

    fn item(id: &str, minor: i64, stock: u32) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: id.to_uppercase(),
            price: Price::from_minor(minor).unwrap(),
            stock,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_every_action_is_persisted() {
        let backend = MemoryCart::default();
        let mut store = CartStore::load(backend.clone()).await;

        store.dispatch(CartAction::Add(item("a", 10_000, 5))).await;
        store.dispatch(CartAction::Add(item("a", 10_000, 5))).await;
        store.dispatch(CartAction::Decrease(ProductId::new("a"))).await;

        assert_eq!(backend.saves(), 3);
        let saved = backend.saved().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_load_restores_saved_cart() {
        let backend = MemoryCart::default();
        {
            let mut store = CartStore::load(backend.clone()).await;
            store.dispatch(CartAction::Add(item("a", 5_000, 5))).await;
            store.dispatch(CartAction::Add(item("b", 3_000, 5))).await;
        }

        let store = CartStore::load(backend).await;
        assert_eq!(store.state().items().len(), 2);
        assert_eq!(store.state().total_amount(), Price::from_minor(8_000).unwrap());
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_fail_mutation() {
        let mut store = CartStore::load(MemoryCart::failing()).await;
        assert!(store.state().is_empty());

        let state = store.dispatch(CartAction::Add(item("a", 10_000, 5))).await;
        assert_eq!(state.item_count(), 1);
        assert_eq!(state.total_amount(), Price::from_minor(10_000).unwrap());
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let backend = MemoryCart::default();
        let mut store = CartStore::load(backend.clone()).await;
        store.dispatch(CartAction::Add(item("a", 10_000, 5))).await;
        store.dispatch(CartAction::Clear).await;

        assert_eq!(backend.saved(), Some(Vec::new()));
        assert_eq!(store.state().total_amount(), Price::ZERO);
    }
}
