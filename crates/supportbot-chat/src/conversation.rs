//! Conversation state.
//!
//! Tracks the user's name, the active topic, the last query and the logged
//! exchanges of a single conversation.

use chrono::Local;
use uuid::Uuid;

use supportbot_core::types::{ConversationContext, LogEntry};

/// State of one conversation with one user.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    /// Name the user introduced themselves with.
    pub user_name: Option<String>,
    pub context: ConversationContext,
    /// Logged exchanges, oldest first.
    pub history: Vec<LogEntry>,
    /// Epoch seconds.
    pub started_at: i64,
    /// Epoch seconds of the last message.
    pub last_message_at: i64,
    pub message_count: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Start a fresh conversation.
    pub fn new() -> Self {
        let now = Local::now().timestamp();
        Self {
            id: Uuid::new_v4(),
            user_name: None,
            context: ConversationContext::default(),
            history: Vec::new(),
            started_at: now,
            last_message_at: now,
            message_count: 0,
        }
    }

    /// Record `query` as the last query and, when given, switch the topic.
    ///
    /// A `None` topic leaves the current topic in place.
    pub fn update_context(&mut self, query: &str, topic: Option<&str>) {
        self.context.last_query = Some(query.to_string());
        if let Some(topic) = topic {
            self.context.topic = Some(topic.to_string());
        }
    }

    /// Mark the conversation as active now.
    pub fn touch(&mut self) {
        self.last_message_at = Local::now().timestamp();
        self.message_count += 1;
    }

    /// Append a logged exchange.
    pub fn record(&mut self, entry: LogEntry) {
        self.history.push(entry);
    }

    /// The last `n` logged exchanges, oldest first.
    pub fn recent_exchanges(&self, n: usize) -> &[LogEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Whether the conversation has been idle longer than `timeout_minutes`.
    pub fn is_expired(&self, timeout_minutes: u32) -> bool {
        let now = Local::now().timestamp();
        now - self.last_message_at > i64::from(timeout_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(input: &str) -> LogEntry {
        LogEntry::new(None, input, "reply", &ConversationContext::default())
    }

    // ---- Creation ----

    #[test]
    fn test_new_conversation_is_empty() {
        let conv = Conversation::new();
        assert_ne!(conv.id, Uuid::nil());
        assert!(conv.user_name.is_none());
        assert!(conv.context.topic.is_none());
        assert!(conv.context.last_query.is_none());
        assert!(conv.history.is_empty());
        assert_eq!(conv.message_count, 0);
    }

    #[test]
    fn test_new_conversation_timestamps() {
        let conv = Conversation::new();
        let now = Local::now().timestamp();
        assert!((conv.started_at - now).abs() < 2);
        assert_eq!(conv.started_at, conv.last_message_at);
    }

    // ---- Context ----

    #[test]
    fn test_update_context_with_topic() {
        let mut conv = Conversation::new();
        conv.update_context("what are your hours", Some("hours"));
        assert_eq!(conv.context.topic.as_deref(), Some("hours"));
        assert_eq!(conv.context.last_query.as_deref(), Some("what are your hours"));
    }

    #[test]
    fn test_update_context_without_topic_keeps_previous() {
        let mut conv = Conversation::new();
        conv.update_context("hello", Some("greeting"));
        conv.update_context("asdf", None);
        assert_eq!(conv.context.topic.as_deref(), Some("greeting"));
        assert_eq!(conv.context.last_query.as_deref(), Some("asdf"));
    }

    // ---- History ----

    #[test]
    fn test_recent_exchanges_returns_tail() {
        let mut conv = Conversation::new();
        for i in 0..7 {
            conv.record(entry(&format!("q{}", i)));
        }
        let recent = conv.recent_exchanges(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].user_input, "q2");
        assert_eq!(recent[4].user_input, "q6");
    }

    #[test]
    fn test_recent_exchanges_shorter_history() {
        let mut conv = Conversation::new();
        conv.record(entry("only"));
        assert_eq!(conv.recent_exchanges(5).len(), 1);
        assert!(Conversation::new().recent_exchanges(5).is_empty());
    }

    // ---- Expiry ----

    #[test]
    fn test_not_expired_when_fresh() {
        assert!(!Conversation::new().is_expired(30));
    }

    #[test]
    fn test_expired_after_timeout() {
        let mut conv = Conversation::new();
        conv.last_message_at = Local::now().timestamp() - 31 * 60;
        assert!(conv.is_expired(30));
    }

    #[test]
    fn test_touch_updates_activity() {
        let mut conv = Conversation::new();
        conv.last_message_at -= 600;
        conv.touch();
        assert_eq!(conv.message_count, 1);
        assert!(!conv.is_expired(1));
    }
}
