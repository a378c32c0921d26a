//! Shopping assistant backed by the Google Gemini `generateContent` API.
//!
//! The assistant receives a trimmed snapshot of the catalog (and, for a
//! signed-in shopper, their own orders) together with either the shopper's
//! question or a default request for a short analysis.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use souq_core::catalog::Product;
use souq_core::order::Order;

use crate::config::AssistantConfig;
use crate::models::Locale;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Upper bound on a shopper's question, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Errors that can occur when asking the assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key cannot be sent as a header.
    #[error("API key contains characters not allowed in a header")]
    InvalidKey,

    /// Gemini returned an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response held no text.
    #[error("empty answer")]
    EmptyAnswer,

    /// Snapshot could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_p: 0.95,
    top_k: 40,
    max_output_tokens: 4096,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined.
    fn answer_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        let text = text.trim();

        (!text.is_empty()).then(|| text.to_owned())
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Catalog and order data handed to the assistant.
///
/// Contact details (phone, address) are left out.
#[derive(Debug, Serialize)]
pub struct ShopSnapshot {
    pub products: Vec<ProductFacts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<OrderFacts>,
}

#[derive(Debug, Serialize)]
pub struct ProductFacts {
    pub title: String,
    pub price: String,
    pub stock: u32,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderFacts {
    pub placed_at: String,
    pub status: &'static str,
    pub payment_method: &'static str,
    pub total: String,
    pub items: Vec<OrderLineFacts>,
}

#[derive(Debug, Serialize)]
pub struct OrderLineFacts {
    pub title: String,
    pub quantity: u32,
    pub unit_price: String,
}

impl ShopSnapshot {
    #[must_use]
    pub fn new(products: &[Product], orders: &[Order]) -> Self {
        Self {
            products: products
                .iter()
                .map(|p| ProductFacts {
                    title: p.title.clone(),
                    price: p.price.display(),
                    stock: p.stock,
                    category: p.category_id.clone(),
                })
                .collect(),
            orders: orders
                .iter()
                .map(|o| OrderFacts {
                    placed_at: o.created_at.format("%Y-%m-%d").to_string(),
                    status: o.status.label(),
                    payment_method: o.payment_method.label(),
                    total: o.total_amount.display(),
                    items: o
                        .items
                        .iter()
                        .map(|line| OrderLineFacts {
                            title: line.title.clone(),
                            quantity: line.quantity,
                            unit_price: line.price.display(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Normalize a shopper's question: trimmed, capped, `None` when blank.
#[must_use]
pub fn clean_question(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_QUESTION_CHARS).collect())
}

/// Build the prompt: shop data as JSON, then the question or the default
/// analysis request.
///
/// # Errors
///
/// Returns `AssistantError::Encode` if the snapshot cannot be serialized.
pub fn build_prompt(
    snapshot: &ShopSnapshot,
    question: Option<&str>,
    locale: Locale,
) -> Result<String, AssistantError> {
    let data = serde_json::to_string_pretty(snapshot)?;
    let language = match locale {
        Locale::En => "English",
        Locale::Ar => "Modern Standard Arabic",
    };

    let task = question.map_or_else(
        || {
            "Give:\n\
             1. A quick summary\n\
             2. Key numbers and statistics\n\
             3. Problems or patterns you notice\n\
             4. Three practical recommendations\n\
             Keep it short, as clear bullet points."
                .to_string()
        },
        |q| format!("Answer this question about the data:\n{q}"),
    );

    Ok(format!(
        "You are a helpful shopping assistant and data analyst for an online store.\n\n\
         Store data:\n{data}\n\n\
         {task}\n\n\
         Reply in {language}. Skip any introduction and get straight to the point."
    ))
}

// =============================================================================
// Client
// =============================================================================

/// Gemini API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl AssistantClient {
    /// Create a client for the configured model.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::InvalidKey` if the key is not a valid header
    /// value, or `AssistantError::Http` if the HTTP client cannot be built.
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| AssistantError::InvalidKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(AssistantClientInner {
                client,
                endpoint: format!("{GEMINI_API_BASE}/{}:generateContent", config.model),
                model: config.model.clone(),
            }),
        })
    }

    /// Send one prompt and return the answer text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Gemini answers with an error
    /// status, or the answer is empty.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model, prompt_len = prompt.len()))]
    pub async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: &GENERATION_CONFIG,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> Result<String, AssistantError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateResponse>()
            .await?
            .answer_text()
            .ok_or(AssistantError::EmptyAnswer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;
    use souq_core::{CartLineItem, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

    use super::*;

    fn product(title: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(title.to_lowercase()),
            title: title.to_string(),
            description: String::new(),
            price: Price::from_minor(1250).unwrap(),
            stock,
            category_id: Some("drinks".to_string()),
            image: None,
            created_at: Utc::now(),
        }
    }

    fn order() -> Order {
        Order {
            id: OrderId::generate(),
            user_id: UserId::new(7),
            user_email: Some("shopper@souq.test".to_string()),
            customer_name: "Mona".to_string(),
            phone: "+20 100 123 4567".to_string(),
            address: "12 Nile St".to_string(),
            payment_method: PaymentMethod::Cash,
            items: vec![CartLineItem {
                id: ProductId::new("green-tea"),
                title: "Green Tea".to_string(),
                price: Price::from_minor(1250).unwrap(),
                quantity: 2,
                stock: 10,
                image: None,
            }],
            total_amount: Price::from_minor(2500).unwrap(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_leaves_out_contact_details() {
        let snapshot = ShopSnapshot::new(&[product("Green Tea", 3)], &[order()]);
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.contains("Green Tea"));
        assert!(json.contains("\"quantity\":2"));
        assert!(!json.contains("Nile"));
        assert!(!json.contains("+20 100"));
        assert!(!json.contains("shopper@souq.test"));
    }

    #[test]
    fn test_snapshot_without_orders_omits_key() {
        let snapshot = ShopSnapshot::new(&[product("Dates", 0)], &[]);
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(!json.contains("orders"));
    }

    #[test]
    fn test_default_prompt_asks_for_analysis() {
        let snapshot = ShopSnapshot::new(&[product("Green Tea", 3)], &[]);
        let prompt = build_prompt(&snapshot, None, Locale::En).unwrap();

        assert!(prompt.contains("Green Tea"));
        assert!(prompt.contains("Three practical recommendations"));
        assert!(prompt.contains("Reply in English"));
    }

    #[test]
    fn test_question_replaces_default_task() {
        let snapshot = ShopSnapshot::new(&[product("Green Tea", 3)], &[]);
        let prompt = build_prompt(&snapshot, Some("What is low on stock?"), Locale::Ar).unwrap();

        assert!(prompt.contains("What is low on stock?"));
        assert!(!prompt.contains("Three practical recommendations"));
        assert!(prompt.contains("Reply in Modern Standard Arabic"));
    }

    #[test]
    fn test_clean_question() {
        assert_eq!(clean_question("   "), None);
        assert_eq!(clean_question("  hi  ").as_deref(), Some("hi"));
        let long = "x".repeat(MAX_QUESTION_CHARS + 50);
        assert_eq!(
            clean_question(&long).unwrap().chars().count(),
            MAX_QUESTION_CHARS
        );
    }

    #[test]
    fn test_request_uses_camel_case_generation_config() {
        let request = GenerateRequest {
            contents: vec![],
            generation_config: &GENERATION_CONFIG,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_answer_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"- one\n"},{"text":"- two "}]}}]}"#,
        )
        .unwrap();

        assert_eq!(response.answer_text().as_deref(), Some("- one\n- two"));
    }

    #[test]
    fn test_answer_text_empty_when_blocked() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(response.answer_text(), None);

        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.answer_text(), None);
    }

    #[test]
    fn test_client_rejects_unprintable_key() {
        let config = AssistantConfig {
            api_key: SecretString::from("bad\nkey"),
            model: "gemini-2.5-flash".to_string(),
        };

        assert!(matches!(
            AssistantClient::new(&config),
            Err(AssistantError::InvalidKey)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = AssistantError::Api {
            status: 429,
            message: "Resource has been exhausted".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): Resource has been exhausted");
    }
}
