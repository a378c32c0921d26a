//! Domain models for storefront.

pub mod notification;
pub mod preferences;
pub mod session;
pub mod user;

pub use notification::{Notification, NotificationLevel, notify, take_notifications};
pub use preferences::{Locale, NavLabels, Preferences, Theme};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
