//! Response pipeline: central coordinator wiring knowledge base, matcher,
//! name extraction, fallback responder and logger.
//!
//! Rules are tried in a fixed order and the first one that applies produces
//! the reply. Only the final fallback stages may reach the network.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use supportbot_core::config::SupportConfig;
use supportbot_core::types::LogEntry;

use crate::conversation::Conversation;
use crate::error::ChatError;
use crate::intent::{extract_name, is_goodbye, is_greeting};
use crate::knowledge::{render, Intent, KnowledgeBase};
use crate::llm::{FallbackResponder, LlmClient};
use crate::logger::ConversationLogger;
use crate::matcher::{FaqMatcher, MatchStrategy};

/// Topic recorded when the fallback responder answered.
pub const LLM_TOPIC: &str = "llm_response";

/// Default maximum message length in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// Customer-support bot.
///
/// Holds no per-user state; every call takes the [`Conversation`] it acts on,
/// so one bot can serve many conversations concurrently.
pub struct SupportBot {
    name: String,
    kb: RwLock<KnowledgeBase>,
    kb_path: Option<PathBuf>,
    matcher: FaqMatcher,
    fallback: Option<Arc<dyn FallbackResponder>>,
    logger: ConversationLogger,
    max_message_length: usize,
    rng: Mutex<StdRng>,
}

impl SupportBot {
    /// Create a bot with an in-memory knowledge base, no fallback responder
    /// and logging disabled.
    pub fn new(name: impl Into<String>, kb: KnowledgeBase) -> Self {
        Self {
            name: name.into(),
            kb: RwLock::new(kb),
            kb_path: None,
            matcher: FaqMatcher::default(),
            fallback: None,
            logger: ConversationLogger::disabled(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Build a bot from configuration.
    ///
    /// Loads the knowledge base from its configured path and, when
    /// `use_llm` is set and the LLM section is enabled, attaches an
    /// [`LlmClient`] as fallback responder.
    pub fn from_config(config: &SupportConfig, use_llm: bool) -> Result<Self, ChatError> {
        let kb_path = config.knowledge_base_path();
        let kb = KnowledgeBase::load(&kb_path)?;

        let strategy: MatchStrategy = config
            .matcher
            .strategy
            .parse()
            .map_err(ChatError::KnowledgeBase)?;
        let matcher = FaqMatcher::new(strategy, config.matcher.threshold);

        let logger = if config.logging.enabled {
            ConversationLogger::new(config.log_dir())
        } else {
            ConversationLogger::disabled()
        };

        let mut bot = Self::new(config.bot.name.clone(), kb)
            .with_kb_path(kb_path)
            .with_matcher(matcher)
            .with_logger(logger)
            .with_max_message_length(config.bot.max_message_length);

        if use_llm && config.llm.enabled {
            bot = bot.with_fallback(Arc::new(LlmClient::new(config.llm.clone())));
        }

        info!(
            name = %bot.name,
            strategy = ?strategy,
            llm = bot.fallback.is_some(),
            "Support bot ready"
        );
        Ok(bot)
    }

    /// Persist FAQ additions to `path`.
    pub fn with_kb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kb_path = Some(path.into());
        self
    }

    pub fn with_matcher(mut self, matcher: FaqMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Answer unmatched queries with `responder`.
    pub fn with_fallback(mut self, responder: Arc<dyn FallbackResponder>) -> Self {
        self.fallback = Some(responder);
        self
    }

    pub fn with_logger(mut self, logger: ConversationLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    /// Make template choice deterministic.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn logger(&self) -> &ConversationLogger {
        &self.logger
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Reject messages longer than the configured maximum.
    pub fn validate(&self, input: &str) -> Result<(), ChatError> {
        if input.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }
        Ok(())
    }

    /// Snapshot of the current knowledge base.
    pub fn knowledge_base(&self) -> KnowledgeBase {
        match self.kb.read() {
            Ok(kb) => kb.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // =========================================================================
    // Response pipeline
    // =========================================================================

    /// Produce the reply to `input`, updating `conv` along the way.
    pub async fn respond(&self, conv: &mut Conversation, input: &str) -> String {
        conv.touch();

        if let Some(reply) = self.rule_reply(conv, input) {
            return reply;
        }

        if let Some(fallback) = &self.fallback {
            conv.update_context(input, Some(LLM_TOPIC));
            debug!(conversation = %conv.id, "No FAQ match, asking fallback responder");
            return fallback
                .respond(input, &conv.history, conv.user_name.as_deref())
                .await;
        }

        conv.update_context(input, None);
        self.pick(Intent::Fallback, None)
    }

    // Every stage that can answer without the fallback responder.
    fn rule_reply(&self, conv: &mut Conversation, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return Some(self.pick(Intent::Fallback, None));
        }

        if let Some(name) = extract_name(input) {
            debug!(conversation = %conv.id, name = %name, "User introduced themselves");
            let reply = self.pick(Intent::NameAcknowledge, Some(&name));
            conv.user_name = Some(name);
            return Some(reply);
        }

        if is_greeting(input) {
            conv.update_context(input, Some(Intent::Greeting.as_str()));
            return Some(self.pick(Intent::Greeting, conv.user_name.as_deref()));
        }

        if is_goodbye(input) {
            conv.update_context(input, Some(Intent::Goodbye.as_str()));
            return Some(self.pick(Intent::Goodbye, conv.user_name.as_deref()));
        }

        let kb = match self.kb.read() {
            Ok(kb) => kb,
            Err(poisoned) => poisoned.into_inner(),
        };
        let best = self.matcher.best_match(input, &kb)?;
        debug!(keyword = %best.keyword, score = best.score, "FAQ matched");

        let answer = {
            let mut rng = self.lock_rng();
            kb.pick_faq(&best.keyword, &mut *rng)
        }?;
        conv.update_context(input, Some(&best.keyword));
        Some(render(&answer, &self.name, conv.user_name.as_deref()))
    }

    fn pick(&self, intent: Intent, user_name: Option<&str>) -> String {
        let template = {
            let kb = match self.kb.read() {
                Ok(kb) => kb,
                Err(poisoned) => poisoned.into_inner(),
            };
            let mut rng = self.lock_rng();
            kb.pick(intent, &mut *rng)
        };
        render(&template, &self.name, user_name)
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // =========================================================================
    // Logging and FAQ maintenance
    // =========================================================================

    /// Record an exchange in the conversation history and the log file.
    ///
    /// Log write failures are reported as warnings only.
    pub fn log_exchange(&self, conv: &mut Conversation, input: &str, response: &str) -> LogEntry {
        let entry = LogEntry::new(conv.user_name.as_deref(), input, response, &conv.context);
        self.logger.log_or_warn(&entry);
        conv.record(entry.clone());
        entry
    }

    /// Add an FAQ answer and persist the knowledge base.
    ///
    /// The in-memory entry is kept even if saving fails; the save error is
    /// returned so callers can report it.
    pub fn add_faq(&self, keyword: &str, response: &str) -> Result<String, ChatError> {
        let mut kb = self
            .kb
            .write()
            .map_err(|e| ChatError::KnowledgeBase(format!("knowledge base lock poisoned: {}", e)))?;
        let message = kb.add_faq(keyword, response)?;

        if let Some(path) = &self.kb_path {
            if let Err(e) = kb.save(path) {
                warn!(error = %e, "FAQ added but knowledge base could not be saved");
                return Err(e);
            }
        }

        info!(keyword = %keyword.trim().to_lowercase(), "FAQ entry added");
        Ok(message)
    }
}
