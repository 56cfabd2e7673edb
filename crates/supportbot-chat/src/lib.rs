//! Conversational engine for the support bot.
//!
//! Provides the knowledge base, text preprocessing and FAQ matching, name
//! extraction, conversation state and logging, the LLM fallback client,
//! and the response pipeline tying them together.

pub mod bot;
pub mod conversation;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod llm;
pub mod logger;
pub mod matcher;
pub mod session;
pub mod text;

pub use bot::SupportBot;
pub use conversation::Conversation;
pub use error::{ChatError, LlmError};
pub use knowledge::{Intent, KnowledgeBase};
pub use llm::{canned_response, CannedResponder, FallbackResponder, LlmClient};
pub use logger::ConversationLogger;
pub use matcher::{FaqMatch, FaqMatcher, MatchStrategy};
pub use session::SessionStore;
