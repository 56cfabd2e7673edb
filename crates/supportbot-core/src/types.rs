use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used for `LogEntry::timestamp`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name recorded for users who never introduced themselves.
pub const ANONYMOUS_USER: &str = "User";

// =============================================================================
// Conversation context
// =============================================================================

/// Minimal per-conversation state carried between turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Intent or FAQ keyword matched most recently.
    pub topic: Option<String>,
    /// Raw text of the last query that updated the context.
    pub last_query: Option<String>,
}

// =============================================================================
// Conversation log records
// =============================================================================

/// One logged exchange, as stored in `conversation_YYYYMMDD.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// User name, or `"User"` when unknown.
    pub user: String,
    pub user_input: String,
    pub bot_response: String,
    /// Snapshot of the conversation context after the exchange.
    #[serde(default)]
    pub context: ConversationContext,
}

impl LogEntry {
    /// Build an entry stamped with the current local time.
    pub fn new(
        user_name: Option<&str>,
        user_input: &str,
        bot_response: &str,
        context: &ConversationContext,
    ) -> Self {
        Self {
            timestamp: Local::now().format(LOG_TIMESTAMP_FORMAT).to_string(),
            user: user_name.unwrap_or(ANONYMOUS_USER).to_string(),
            user_input: user_input.to_string(),
            bot_response: bot_response.to_string(),
            context: context.clone(),
        }
    }

    /// Parse `timestamp` back into a naive local datetime.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, LOG_TIMESTAMP_FORMAT).ok()
    }
}
