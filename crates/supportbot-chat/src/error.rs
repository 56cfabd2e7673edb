//! Error types for the chat engine.

use supportbot_core::error::SupportError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("both keyword and response are required")]
    MissingFaqFields,
    #[error("knowledge base error: {0}")]
    KnowledgeBase(String),
    #[error("log error: {0}")]
    Log(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl From<SupportError> for ChatError {
    fn from(err: SupportError) -> Self {
        ChatError::KnowledgeBase(err.to_string())
    }
}

/// Errors from the remote chat-completion client.
///
/// These never reach the user: the client answers with a canned response
/// instead. They exist so the failure reason can be logged and tested.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP client unavailable")]
    ClientUnavailable,
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::MessageTooLong(2000);
        assert_eq!(
            err.to_string(),
            "message exceeds maximum length of 2000 characters"
        );

        let err = ChatError::MissingFaqFields;
        assert_eq!(err.to_string(), "both keyword and response are required");

        let err = ChatError::KnowledgeBase("disk full".to_string());
        assert_eq!(err.to_string(), "knowledge base error: disk full");

        let err = ChatError::Log("permission denied".to_string());
        assert_eq!(err.to_string(), "log error: permission denied");
    }

    #[test]
    fn test_llm_error_display() {
        assert_eq!(LlmError::MissingApiKey.to_string(), "no API key configured");

        let err = LlmError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 401: unauthorized");

        let err = LlmError::Malformed("no choices".to_string());
        assert_eq!(err.to_string(), "malformed response: no choices");
    }

    #[test]
    fn test_chat_error_from_llm_error() {
        let err: ChatError = LlmError::MissingApiKey.into();
        assert!(matches!(err, ChatError::Llm(LlmError::MissingApiKey)));
        assert_eq!(err.to_string(), "LLM error: no API key configured");
    }

    #[test]
    fn test_chat_error_from_support_error() {
        let err: ChatError = SupportError::Config("bad".to_string()).into();
        assert!(matches!(err, ChatError::KnowledgeBase(_)));
        assert!(err.to_string().contains("bad"));
    }
}
