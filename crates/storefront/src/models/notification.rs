//! Flash notifications.
//!
//! A handler queues a notification in the session before redirecting; the
//! next full page render drains the queue and shows it once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

impl NotificationLevel {
    /// CSS class suffix used by the layout.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Queue a notification for the next page render.
///
/// Failures are logged and swallowed: a lost notification must never turn
/// a completed action into an error.
pub async fn notify(session: &Session, notification: Notification) {
    let mut queued: Vec<Notification> = session
        .get(keys::NOTIFICATIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(notification);

    if let Err(e) = session.insert(keys::NOTIFICATIONS, queued).await {
        tracing::warn!("Failed to queue notification: {e}");
    }
}

/// Drain all queued notifications.
///
/// The session is only touched when something is queued, so plain page
/// views do not mark it as modified.
pub async fn take_notifications(session: &Session) -> Vec<Notification> {
    let queued = match session.get::<Vec<Notification>>(keys::NOTIFICATIONS).await {
        Ok(Some(queued)) => queued,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read notifications: {e}");
            return Vec::new();
        }
    };

    if let Err(e) = session.remove_value(keys::NOTIFICATIONS).await {
        tracing::warn!("Failed to clear notifications: {e}");
    }
    queued
}
