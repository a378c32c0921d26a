//! Theme and language toggles.
//!
//! Both toggles flip the stored value and send the visitor back to the page
//! they came from.

use axum::{
    http::{HeaderMap, header},
    response::Redirect,
};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use super::local_path_or;
use crate::models::Preferences;

/// Path (and query) of the referring page, if any.
fn referring_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let url = Url::parse(referer).ok()?;
    Some(match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    })
}

async fn update(
    session: &Session,
    headers: &HeaderMap,
    change: impl FnOnce(&mut Preferences),
) -> Redirect {
    let mut prefs = Preferences::load(session).await;
    change(&mut prefs);

    if let Err(e) = prefs.save(session).await {
        tracing::warn!("Failed to save preferences: {e}");
    }

    let back = referring_path(headers);
    Redirect::to(local_path_or(back.as_deref(), "/"))
}

/// Switch between light and dark.
#[instrument(skip_all)]
pub async fn toggle_theme(session: Session, headers: HeaderMap) -> Redirect {
    update(&session, &headers, |prefs| prefs.theme = prefs.theme.toggled()).await
}

/// Switch between English and Arabic.
#[instrument(skip_all)]
pub async fn toggle_locale(session: Session, headers: HeaderMap) -> Redirect {
    update(&session, &headers, |prefs| prefs.locale = prefs.locale.toggled()).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn referer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_referring_path_keeps_query() {
        assert_eq!(
            referring_path(&referer("http://localhost:3000/products?page=2")).as_deref(),
            Some("/products?page=2")
        );
    }

    #[test]
    fn test_missing_or_bad_referer() {
        assert_eq!(referring_path(&HeaderMap::new()), None);
        assert_eq!(referring_path(&referer("not a url")), None);
    }
}
