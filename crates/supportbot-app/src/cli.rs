//! CLI argument definitions for the support bot.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "supportbot.toml";

/// Customer-support chatbot with FAQ matching and an optional LLM fallback.
#[derive(Parser, Debug)]
#[command(name = "supportbot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the knowledge base and conversation logs.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API and web chat page.
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Chat interactively in the terminal.
    Chat {
        /// Never call the LLM; unmatched questions get canned answers.
        #[arg(long = "no-llm")]
        no_llm: bool,
    },
    /// Send one or more messages in a single conversation and print the replies.
    Ask {
        /// Messages, answered in order.
        #[arg(required = true)]
        messages: Vec<String>,
        /// Never call the LLM.
        #[arg(long = "no-llm")]
        no_llm: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SUPPORTBOT_CONFIG env var > ./supportbot.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SUPPORTBOT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > SUPPORTBOT_PORT env var > config file value > 5000.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Command::Serve { port: Some(p), .. } = self.command {
            return p;
        }
        if let Ok(val) = std::env::var("SUPPORTBOT_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        5000
    }

    /// Resolve the bind address.
    ///
    /// Priority: --host flag > config file value.
    pub fn resolve_host(&self, config_host: &str) -> String {
        match &self.command {
            Command::Serve { host: Some(h), .. } => h.clone(),
            _ => config_host.to_string(),
        }
    }

    /// Resolve the data directory path.
    ///
    /// Returns `None` if not overridden (use config value).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value. The terminal
    /// commands default to `warn` so logs do not interleave with the chat.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        match self.command {
            Command::Serve { .. } => config_level.to_string(),
            Command::Chat { .. } | Command::Ask { .. } => "warn".to_string(),
        }
    }

    /// Whether the LLM fallback may be used.
    pub fn use_llm(&self) -> bool {
        match self.command {
            Command::Serve { .. } => true,
            Command::Chat { no_llm } | Command::Ask { no_llm, .. } => !no_llm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("supportbot").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_serve_flags() {
        let args = parse(&["serve", "--host", "0.0.0.0", "-p", "8080"]);
        assert_eq!(args.resolve_port(5000), 8080);
        assert_eq!(args.resolve_host("127.0.0.1"), "0.0.0.0");
        assert!(args.use_llm());
    }

    #[test]
    fn test_serve_falls_back_to_config_host() {
        let args = parse(&["serve"]);
        assert_eq!(args.resolve_host("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["chat", "--data-dir", "/tmp/bot", "--log-level", "debug"]);
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/tmp/bot"));
        assert_eq!(args.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_chat_defaults_to_quiet_logging() {
        let args = parse(&["chat"]);
        assert_eq!(args.resolve_log_level("info"), "warn");
        let args = parse(&["serve"]);
        assert_eq!(args.resolve_log_level("info"), "info");
    }

    #[test]
    fn test_no_llm_flag() {
        assert!(!parse(&["chat", "--no-llm"]).use_llm());
        assert!(parse(&["chat"]).use_llm());
        assert!(!parse(&["ask", "--no-llm", "hello"]).use_llm());
    }

    #[test]
    fn test_ask_collects_messages() {
        let args = parse(&["ask", "Hello", "What are your store hours?"]);
        match args.command {
            Command::Ask { messages, .. } => {
                assert_eq!(messages, vec!["Hello", "What are your store hours?"]);
            }
            other => panic!("Expected Ask, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_requires_a_message() {
        let result =
            CliArgs::try_parse_from(["supportbot", "ask"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["--config", "/etc/bot.toml", "chat"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/bot.toml"));
    }
}
