//! Authentication route handlers.
//!
//! Email and password login and registration. Failed attempts re-render the
//! form with the message; success stores the user in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::shell::Shell;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Notification, User, notify};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub shell: Shell,
    pub error: Option<String>,
    pub email: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Put `user` in the session and move on to the home page.
async fn sign_in(session: &Session, user: User, greeting: &str) -> Response {
    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };

    if let Err(e) = set_current_user(session, &current).await {
        tracing::error!("Failed to set session: {e}");
        notify(session, Notification::error("Could not sign you in. Please try again.")).await;
        return Redirect::to("/auth/login").into_response();
    }

    set_sentry_user(&current.id, Some(current.email.as_str()));
    notify(session, Notification::success(greeting)).await;
    Redirect::to("/").into_response()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        shell: Shell::load(&state, &session, None).await,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => sign_in(&session, user, "Welcome back!").await,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            (
                auth_status(&e),
                LoginTemplate {
                    shell: Shell::load(&state, &session, None).await,
                    error: Some(e.user_message()),
                    email: form.email,
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        shell: Shell::load(&state, &session, None).await,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle registration form submission. A new account is signed in
/// straight away.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let result = if form.password == form.password_confirm {
        AuthService::new(state.pool())
            .register_with_password(&form.email, &form.password)
            .await
    } else {
        Err(AuthError::WeakPassword("Passwords do not match".to_owned()))
    };

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            sign_in(&session, user, "Your account is ready.").await
        }
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            (
                auth_status(&e),
                RegisterTemplate {
                    shell: Shell::load(&state, &session, None).await,
                    error: Some(e.user_message()),
                    email: form.email,
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/")
}
