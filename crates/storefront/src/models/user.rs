//! User domain types.

use chrono::{DateTime, Utc};

use souq_core::{Email, UserId};

/// A storefront customer account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
