//! Embedded chat page.
//!
//! A single self-contained HTML file with inline CSS and JavaScript, embedded
//! at compile time via `include_str!` so the binary has no runtime file
//! dependencies.
//!
//! The page talks to the same origin:
//!
//! - `POST /api/chat` with `{message, session_id}`; the returned `sessionId`
//!   is kept in `sessionStorage` so a browser tab keeps its conversation.
//! - `POST /api/add-faq` from the "Teach the bot" form.

/// The complete chat page HTML.
pub const CHAT_PAGE_HTML: &str = include_str!("../assets/chat.html");
