//! Shopping assistant page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::shell::Shell;
use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::assistant::{ShopSnapshot, build_prompt, clean_question};
use crate::state::AppState;

/// Ready-made questions offered as buttons.
const PRESETS: &[&str] = &[
    "Which products are running low on stock?",
    "Suggest a gift under 20.00",
    "Summarize my past orders",
];

/// Assistant form data.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// Assistant page template.
#[derive(Template, WebTemplate)]
#[template(path = "assistant/show.html")]
pub struct AssistantTemplate {
    pub shell: Shell,
    pub enabled: bool,
    pub presets: &'static [&'static str],
    pub question: String,
    pub answer: Option<String>,
    pub failed: bool,
}

impl AssistantTemplate {
    fn new(shell: Shell, enabled: bool) -> Self {
        Self {
            shell,
            enabled,
            presets: PRESETS,
            question: String::new(),
            answer: None,
            failed: false,
        }
    }
}

/// Show the assistant form.
#[instrument(skip_all)]
pub async fn page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> AssistantTemplate {
    let shell = Shell::load(&state, &session, user.as_ref()).await;
    AssistantTemplate::new(shell, state.assistant().is_some())
}

/// Ask the assistant about the catalog and, when signed in, the shopper's
/// orders. A blank question asks for a general analysis.
#[instrument(skip_all, fields(signed_in = user.is_some()))]
pub async fn ask(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AskForm>,
) -> Result<Response, AppError> {
    let shell = Shell::load(&state, &session, user.as_ref()).await;

    let Some(client) = state.assistant() else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            AssistantTemplate::new(shell, false),
        )
            .into_response());
    };

    let question = clean_question(&form.question);
    let snapshot = snapshot_for(&state, user.as_ref()).await?;
    let prompt = build_prompt(&snapshot, question.as_deref(), shell.preferences.locale)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut template = AssistantTemplate::new(shell, true);
    template.question = question.unwrap_or_default();

    match client.ask(&prompt).await {
        Ok(answer) => template.answer = Some(answer),
        Err(e) => {
            warn!(error = %e, "Assistant request failed");
            template.failed = true;
        }
    }

    Ok(template.into_response())
}

async fn snapshot_for(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> Result<ShopSnapshot, AppError> {
    let products = state.catalog().products().await?;
    let orders = match user {
        Some(user) => {
            OrderRepository::new(state.pool())
                .list_for_user(user.id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(ShopSnapshot::new(&products, &orders))
}
