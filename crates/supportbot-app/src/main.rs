//! Support bot binary - composition root.
//!
//! 1. Parse CLI arguments, load configuration and initialize tracing
//! 2. Load `.env` and apply CLI overrides
//! 3. Build the bot (knowledge base, matcher, logger, LLM fallback)
//! 4. Run the requested command: HTTP server, terminal chat, or one-shot ask

mod cli;
mod repl;

use std::path::Path;

use clap::Parser;

use supportbot_api::routes;
use supportbot_api::state::AppState;
use supportbot_chat::SupportBot;
use supportbot_core::config::{GeneralConfig, SupportConfig};

use cli::{CliArgs, Command};

/// Load `.env` from the working directory, if present.
fn load_dotenv() {
    if Path::new(".env").exists() {
        match dotenv::from_filename(".env") {
            Ok(_) => tracing::info!("Loaded .env file from current directory"),
            Err(e) => tracing::warn!("Failed to load .env file: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing first so configuration problems are reported. RUST_LOG
    // overrides the resolved level.
    let config_file = args.resolve_config_path();
    let loaded = SupportConfig::load_optional(&config_file);
    let file_level = match &loaded {
        Ok(Some(config)) => config.general.log_level.clone(),
        _ => GeneralConfig::default().log_level,
    };
    let log_level = args.resolve_log_level(&file_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Support Bot v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(Some(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Ok(None) => {
            tracing::info!(path = %config_file.display(), "No configuration file found, using defaults");
            SupportConfig::default()
        }
        Err(e) => {
            tracing::error!(path = %config_file.display(), error = %e, "Invalid configuration file");
            return Err(e.into());
        }
    };
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    config.general.log_level = log_level;

    load_dotenv();

    let bot = SupportBot::from_config(&config, args.use_llm())?;

    match &args.command {
        Command::Serve { .. } => {
            config.server.host = args.resolve_host(&config.server.host);
            config.server.port = args.resolve_port(config.server.port);
            let server = config.server.clone();
            let state = AppState::new(config, bot);
            routes::start_server(&server, state).await?;
        }
        Command::Chat { .. } => {
            repl::run(&bot).await?;
        }
        Command::Ask { messages, .. } => {
            repl::ask(&bot, messages).await;
        }
    }

    Ok(())
}
