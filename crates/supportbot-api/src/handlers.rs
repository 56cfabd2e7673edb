//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its JSON body via axum extractors, interacts with
//! AppState services, and returns JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, MISSING_FAQ_FIELDS};
use crate::page::CHAT_PAGE_HTML;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

/// Request body for POST /api/chat.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Missing messages are treated as empty.
    #[serde(default)]
    pub message: String,
    /// Conversation to continue. Omit to start a new one.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// Request body for POST /api/add-faq.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddFaqRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub response: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponseBody {
    pub response: String,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddFaqResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: u64,
    pub llm_enabled: bool,
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET / - serve the chat page.
pub async fn index() -> impl IntoResponse {
    Html(CHAT_PAGE_HTML)
}

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.sessions.len() as u64,
        llm_enabled: state.bot.has_fallback(),
    })
}

/// POST /api/chat - reply to one message and log the exchange.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let Json(req) = payload.map_err(bad_json)?;
    state.bot.validate(&req.message)?;

    // Requests on one session are answered one at a time.
    let shared = state.sessions.checkout(req.session_id);
    let mut conv = shared.lock().await;
    let response = state.bot.respond(&mut conv, &req.message).await;
    state.bot.log_exchange(&mut conv, &req.message, &response);

    Ok(Json(ChatResponseBody {
        response,
        user_name: conv.user_name.clone(),
        session_id: conv.id,
    }))
}

/// POST /api/add-faq - add an answer to the knowledge base.
pub async fn add_faq(
    State(state): State<AppState>,
    payload: Result<Json<AddFaqRequest>, JsonRejection>,
) -> Result<Json<AddFaqResponse>, ApiError> {
    let Json(req) = payload.map_err(bad_json)?;
    if req.keyword.trim().is_empty() || req.response.trim().is_empty() {
        return Err(ApiError::BadRequest(MISSING_FAQ_FIELDS.to_string()));
    }

    let message = state.bot.add_faq(&req.keyword, &req.response)?;
    Ok(Json(AddFaqResponse { message }))
}
