//! Application state shared across all route handlers.
//!
//! Passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use supportbot_chat::{SessionStore, SupportBot};
use supportbot_core::config::SupportConfig;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<SupportConfig>,
    /// The bot answering every session.
    pub bot: Arc<SupportBot>,
    /// Per-client conversations.
    pub sessions: Arc<SessionStore>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState around `bot`.
    pub fn new(config: SupportConfig, bot: SupportBot) -> Self {
        let sessions = SessionStore::new(config.server.session_timeout_minutes);
        Self {
            config: Arc::new(config),
            bot: Arc::new(bot),
            sessions: Arc::new(sessions),
            start_time: Instant::now(),
        }
    }
}
