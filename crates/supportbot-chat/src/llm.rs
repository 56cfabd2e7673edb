//! Remote LLM fallback for queries the knowledge base cannot answer.
//!
//! Sends the query, the trailing conversation history and a support-agent
//! system prompt to an OpenAI-compatible chat-completion endpoint. Any
//! failure degrades to a canned keyword response, so callers always get
//! an answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use supportbot_core::config::LlmConfig;
use supportbot_core::types::LogEntry;

use crate::error::LlmError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Persona given to the model on every request.
pub const SYSTEM_PROMPT: &str = "You are a helpful customer support assistant for a small business.
Your goal is to be helpful, concise, and friendly. If you don't know the answer to something,
just say you don't have that information rather than making something up.
If the user is looking for specific product information you don't have, offer to take their contact details
to have someone follow up with them.";

// =============================================================================
// Canned responses
// =============================================================================

const SKINCARE_RESPONSE: &str = "For skincare questions, I recommend products with hyaluronic acid for hydration and niacinamide for skin barrier protection. We have various options depending on your specific skin concerns.";
const PRICING_RESPONSE: &str = "We offer several pricing plans: Basic ($9.99/month), Premium ($19.99/month), and Enterprise (custom pricing). Each offers different features tailored to business size and needs.";
const SHIPPING_RESPONSE: &str = "We offer standard shipping (3-5 business days), express shipping (1-2 business days), and overnight shipping options. Free shipping is available on orders over $50.";
const RETURNS_RESPONSE: &str = "Our return policy allows you to return unused items within 30 days of purchase for a full refund. Just include your order number with the return.";

/// Answer used when no canned group matches.
pub const FORWARD_RESPONSE: &str = "I don't have specific information on that topic. Would you like me to forward your question to our product specialist?";

// Checked in order; stems match by substring so "ship" covers "shipping".
static CANNED_GROUPS: &[(&[&str], &str)] = &[
    (&["skin", "moisturizer", "lotion", "cream"], SKINCARE_RESPONSE),
    (&["price", "cost", "plan", "subscription", "premium"], PRICING_RESPONSE),
    (&["ship", "delivery", "arrive"], SHIPPING_RESPONSE),
    (&["return", "refund", "money back"], RETURNS_RESPONSE),
];

/// Static answer chosen by keyword stems in `query`.
pub fn canned_response(query: &str) -> &'static str {
    let lower = query.to_lowercase();
    CANNED_GROUPS
        .iter()
        .find(|(stems, _)| stems.iter().any(|s| lower.contains(s)))
        .map(|(_, response)| *response)
        .unwrap_or(FORWARD_RESPONSE)
}

// =============================================================================
// FallbackResponder
// =============================================================================

/// Answers queries the knowledge base could not match.
#[async_trait]
pub trait FallbackResponder: Send + Sync {
    /// Produce an answer. Implementations must not fail; they degrade to a
    /// static answer instead.
    async fn respond(&self, query: &str, history: &[LogEntry], user_name: Option<&str>)
        -> String;
}

/// Responder that only uses the canned keyword answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

#[async_trait]
impl FallbackResponder for CannedResponder {
    async fn respond(
        &self,
        query: &str,
        _history: &[LogEntry],
        _user_name: Option<&str>,
    ) -> String {
        canned_response(query).to_string()
    }
}

// =============================================================================
// LlmClient
// =============================================================================

/// One message of the chat-completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
pub struct LlmClient {
    config: LlmConfig,
    api_key: Option<String>,
    /// `None` when the HTTP client could not be built.
    client: Option<Client>,
}

impl LlmClient {
    /// Create a client, resolving the API key from the config or environment.
    pub fn new(config: LlmConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "No LLM API key found; unmatched queries will get canned responses"
            );
        }
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit key (or none).
    pub fn with_api_key(config: LlmConfig, api_key: Option<String>) -> Self {
        let client = match Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Failed to build LLM HTTP client; unmatched queries will get canned responses");
                None
            }
        };
        Self {
            config,
            api_key,
            client,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Build the prompt: system persona, trailing exchanges, current query.
    pub fn build_messages(
        &self,
        query: &str,
        history: &[LogEntry],
        user_name: Option<&str>,
    ) -> Vec<PromptMessage> {
        let mut system = SYSTEM_PROMPT.to_string();
        if let Some(name) = user_name {
            system.push_str(&format!("\nThe customer's name is {}.", name));
        }

        let mut messages = vec![PromptMessage::new("system", &system)];

        let start = history.len().saturating_sub(self.config.history_exchanges);
        for exchange in &history[start..] {
            messages.push(PromptMessage::new("user", &exchange.user_input));
            messages.push(PromptMessage::new("assistant", &exchange.bot_response));
        }

        messages.push(PromptMessage::new("user", query));
        messages
    }

    /// Ask the model. Errors describe why no usable answer was produced.
    pub async fn complete(
        &self,
        query: &str,
        history: &[LogEntry],
        user_name: Option<&str>,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let client = self.client.as_ref().ok_or(LlmError::ClientUnavailable)?;
        let messages = self.build_messages(query, history, user_name);
        let payload = CompletionRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Sending chat-completion request"
        );

        let resp = client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;
        parse_completion(&json)
    }
}

/// Extract `choices[0].message.content`, trimmed and non-empty.
fn parse_completion(json: &Value) -> Result<String, LlmError> {
    let content = json["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .ok_or_else(|| LlmError::Malformed(format!("unexpected response: {}", json)))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::Malformed("empty content".to_string()));
    }
    Ok(content.to_string())
}

#[async_trait]
impl FallbackResponder for LlmClient {
    async fn respond(
        &self,
        query: &str,
        history: &[LogEntry],
        user_name: Option<&str>,
    ) -> String {
        match self.complete(query, history, user_name).await {
            Ok(answer) => answer,
            Err(LlmError::MissingApiKey) => canned_response(query).to_string(),
            Err(e) => {
                warn!(error = %e, "LLM request failed, using canned response");
                canned_response(query).to_string()
            }
        }
    }
}
