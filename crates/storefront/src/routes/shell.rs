//! Navigation shell shared by every full page: search box, cart badge,
//! signed-in user, theme and language, and queued flash notifications.

use tower_sessions::Session;

use souq_core::cart::CartState;

use crate::models::{CurrentUser, NavLabels, Notification, Preferences, take_notifications};
use crate::services::{CartStore, SessionCartStorage};
use crate::state::AppState;

/// Data the base layout needs.
pub struct Shell {
    pub user_email: Option<String>,
    pub cart_count: u32,
    pub notifications: Vec<Notification>,
    /// Text to pre-fill in the search box.
    pub search_query: String,
    pub preferences: Preferences,
    /// Navigation text in the visitor's language.
    pub labels: &'static NavLabels,
}

impl Shell {
    /// Build the shell for a page that already has the cart loaded.
    pub async fn with_cart(session: &Session, user: Option<&CurrentUser>, cart: &CartState) -> Self {
        let preferences = Preferences::load(session).await;

        Self {
            user_email: user.map(|u| u.email.to_string()),
            cart_count: cart.item_count(),
            notifications: take_notifications(session).await,
            search_query: String::new(),
            preferences,
            labels: preferences.locale.labels(),
        }
    }

    /// Build the shell, loading the cart only to count it.
    pub async fn load(state: &AppState, session: &Session, user: Option<&CurrentUser>) -> Self {
        let cart = load_cart(state, session, user).await;
        Self::with_cart(session, user, cart.state()).await
    }

    /// Pre-fill the search box.
    #[must_use]
    pub fn searching(mut self, query: &str) -> Self {
        query.clone_into(&mut self.search_query);
        self
    }
}

/// Load this session's cart store.
pub async fn load_cart(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
) -> CartStore<SessionCartStorage> {
    CartStore::load(SessionCartStorage::new(session.clone(), state.pool(), user)).await
}
