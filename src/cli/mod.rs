mod noninteractive;
pub mod output;
mod repl;
pub mod tui;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::backend::HttpBackend;
use crate::chat::Chat;
use crate::core::config::{self, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "holiya-chat", version, about = "Chat with the Holiya medical AI agent")]
struct Cli {
    /// Non-interactive mode: send one message and print the reply
    #[arg(short, long)]
    prompt: Option<String>,

    /// Open an existing session by its number
    #[arg(long, value_name = "DB_ID")]
    session: Option<i64>,

    /// Output format for non-interactive mode
    #[arg(short = 'f', long, default_value = "text")]
    output_format: OutputFormat,

    /// Use simple REPL mode instead of the TUI
    #[arg(long)]
    repl: bool,

    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// User id whose sessions are used (overrides config)
    #[arg(long)]
    user_id: Option<i64>,

    /// Directory to look for holiya-chat.json in
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        config::load_config(cli.working_dir.clone()).map_err(|e| anyhow::anyhow!("{e}"))?;
    apply_overrides(&mut config, &cli);

    let tui_mode = cli.prompt.is_none() && !cli.repl;
    init_logging(config.debug, tui_mode);
    tracing::debug!(base_url = %config.base_url, user_id = config.user_id, "config");

    let mut chat = Chat::new(Arc::new(HttpBackend::from_config(&config)));

    if let Some(prompt) = cli.prompt {
        return noninteractive::run(chat, prompt, cli.session, cli.output_format).await;
    }

    if let Some(db_id) = cli.session {
        if chat.open_session_by_id(db_id).await.is_none() {
            eprintln!("Session {db_id} not found; starting without a session.");
        }
    }

    if cli.repl {
        repl::run(chat).await
    } else {
        tui::run(chat).await
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    if cli.debug {
        config.debug = true;
    }
}

/// Logs go to stderr, except in TUI mode where they would corrupt the screen
/// and are written to a file under the cache directory instead.
fn init_logging(debug: bool, tui_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if !tui_mode {
        builder.with_writer(std::io::stderr).init();
        return;
    }

    match open_log_file() {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = config::log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("holiya-chat.log"))
        .ok()
}
