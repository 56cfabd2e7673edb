use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SupportError};

/// Top-level configuration for the support bot.
///
/// Loaded from `supportbot.toml` by default. Every section is optional and
/// falls back to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl SupportConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SupportConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists.
    ///
    /// A missing file is `Ok(None)`. A file that exists but cannot be read
    /// or parsed is an error rather than a silent fallback to defaults.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SupportError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Resolve a possibly relative path against `general.data_dir`.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            expand_home(&self.general.data_dir).join(p)
        }
    }

    /// Absolute location of the knowledge base file.
    pub fn knowledge_base_path(&self) -> PathBuf {
        self.resolve_path(&self.bot.knowledge_base)
    }

    /// Absolute location of the conversation log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.resolve_path(&self.logging.log_dir)
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/").or_else(|| dir.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(dir)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Base directory for the knowledge base and logs.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Bot persona and knowledge base location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Display name substituted into `{bot_name}` templates.
    pub name: String,
    /// Knowledge base JSON file, relative to `data_dir` unless absolute.
    pub knowledge_base: String,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Support Bot".to_string(),
            knowledge_base: "knowledge_base.json".to_string(),
            max_message_length: 2000,
        }
    }
}

/// FAQ matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Matching strategy: "keyword", "overlap" or "dice".
    pub strategy: String,
    /// Minimum similarity a FAQ entry must exceed to be selected.
    pub threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: "dice".to_string(),
            threshold: 0.2,
        }
    }
}

/// Conversation log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether exchanges are written to per-day JSON files.
    pub enabled: bool,
    /// Directory for `conversation_YYYYMMDD.json` files.
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_dir: "logs".to_string(),
        }
    }
}

/// Remote chat-completion fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether unmatched queries are delegated to the LLM.
    pub enabled: bool,
    /// Chat-completion endpoint.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Explicit API key. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of trailing exchanges included in the prompt.
    pub history_exchanges: usize,
    /// Value of the `HTTP-Referer` header.
    pub referer: String,
    /// Value of the `X-Title` header.
    pub app_title: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-3.5-turbo".to_string(),
            api_key: None,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            history_exchanges: 5,
            referer: "https://your-website.com".to_string(),
            app_title: "Support Bot".to_string(),
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: explicit value first, then the environment.
    ///
    /// Blank values are treated as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Idle minutes after which a chat session is discarded.
    pub session_timeout_minutes: u32,
    /// Requests per second allowed on `/api/*` routes.
    pub rate_limit_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            session_timeout_minutes: 30,
            rate_limit_per_sec: 50,
        }
    }
}
