//! Display preferences: colour theme and interface language.
//!
//! Both are kept in the session and rendered by the layout as
//! `data-theme`, `lang` and `dir` on the root element.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Value of the `data-theme` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// BCP 47 language tag for the `lang` attribute.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Text direction for the `dir` attribute.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::En => "ltr",
            Self::Ar => "rtl",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::En => Self::Ar,
            Self::Ar => Self::En,
        }
    }

    /// Navigation labels in this language.
    #[must_use]
    pub const fn labels(self) -> &'static NavLabels {
        match self {
            Self::En => &EN_LABELS,
            Self::Ar => &AR_LABELS,
        }
    }
}

/// Translated text for the navigation shell.
#[derive(Debug)]
pub struct NavLabels {
    pub shop: &'static str,
    pub cart: &'static str,
    pub orders: &'static str,
    pub assistant: &'static str,
    pub log_in: &'static str,
    pub log_out: &'static str,
    pub search_placeholder: &'static str,
    pub toggle_theme: &'static str,
    /// Label naming the language the toggle switches to.
    pub other_language: &'static str,
}

const EN_LABELS: NavLabels = NavLabels {
    shop: "Shop",
    cart: "Cart",
    orders: "My orders",
    assistant: "Assistant",
    log_in: "Log in",
    log_out: "Log out",
    search_placeholder: "Search products",
    toggle_theme: "Toggle theme",
    other_language: "العربية",
};

const AR_LABELS: NavLabels = NavLabels {
    shop: "المتجر",
    cart: "السلة",
    orders: "طلباتي",
    assistant: "المساعد",
    log_in: "تسجيل الدخول",
    log_out: "تسجيل الخروج",
    search_placeholder: "ابحث عن المنتجات",
    toggle_theme: "تبديل المظهر",
    other_language: "English",
};

/// Theme and language chosen by this visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub locale: Locale,
}

impl Preferences {
    /// Read the visitor's preferences, falling back to the defaults.
    pub async fn load(session: &Session) -> Self {
        match session.get::<Self>(keys::PREFERENCES).await {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read preferences: {e}");
                Self::default()
            }
        }
    }

    /// Store these preferences in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::PREFERENCES, self).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[test]
    fn test_toggles_flip() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Locale::En.toggled(), Locale::Ar);
        assert_eq!(Locale::Ar.toggled().dir(), "ltr");
    }

    #[test]
    fn test_arabic_is_right_to_left() {
        assert_eq!(Locale::Ar.code(), "ar");
        assert_eq!(Locale::Ar.dir(), "rtl");
        assert_eq!(Locale::Ar.labels().other_language, "English");
    }

    #[tokio::test]
    async fn test_preferences_round_trip_through_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(Preferences::load(&session).await, Preferences::default());

        let prefs = Preferences {
            theme: Theme::Dark,
            locale: Locale::Ar,
        };
        prefs.save(&session).await.unwrap();
        assert_eq!(Preferences::load(&session).await, prefs);
    }
}
