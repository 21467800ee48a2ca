//! Concierge: command-line driver for a hosted assistant.
//!
//! Usage:
//!   concierge init           Write a default config file
//!   concierge chat           Interactive conversation
//!   concierge ask <TEXT>     Single turn
//!   concierge status         Show config and persisted session
//!   concierge tools          Print the advertised function tools
//!   concierge reset          Forget persisted session identifiers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use concierge::agent::{self, NullSink, RunStrategy, TextSink};
use concierge::api::AssistantsClient;
use concierge::config::{self, ConciergeConfig, CONFIG_FILE};
use concierge::session::{JsonFileStore, ResourceKind, Session, SessionStore};
use concierge::tools::{self, ToolRegistry};
use concierge::types::TurnReply;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(version = "0.1.0")]
#[command(about = "Chat with a hosted assistant that calls local tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to concierge home directory.
    #[arg(long, default_value_os_t = config::default_home_dir())]
    home: PathBuf,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(long)]
        force: bool,
    },

    /// Start an interactive conversation.
    Chat {
        /// Stream replies as they are written.
        #[arg(long)]
        stream: bool,
    },

    /// Send a single message and print the reply.
    Ask {
        /// Message text.
        text: Vec<String>,

        /// Stream the reply as it is written.
        #[arg(long)]
        stream: bool,
    },

    /// Show configuration and persisted session identifiers.
    Status,

    /// Print the function tools advertised to the assistant.
    Tools,

    /// Forget persisted session identifiers. Remote resources are kept.
    Reset,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let home_dir = PathBuf::from(shellexpand::tilde(&cli.home.to_string_lossy()).into_owned());
    let config_path = home_dir.join(CONFIG_FILE);
    let mut cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config::apply_env_overrides(&mut cfg);

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { force } => cmd_init(&config_path, force),
        Commands::Chat { stream } => cmd_chat(cfg, stream).await,
        Commands::Ask { text, stream } => cmd_ask(cfg, &text.join(" "), stream).await,
        Commands::Status => cmd_status(&cfg, &config_path),
        Commands::Tools => cmd_tools(&cfg),
        Commands::Reset => cmd_reset(&cfg),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }
    config::save_config(&ConciergeConfig::default(), config_path)?;
    println!(
        "{} Wrote default config to {}",
        ">>>".green().bold(),
        config_path.display()
    );
    Ok(())
}

async fn cmd_chat(cfg: ConciergeConfig, stream: bool) -> Result<()> {
    let ctx = connect(cfg, stream).await?;

    println!(
        "{} Chatting with '{}' ({}). Type `exit` to quit.",
        ">>>".green().bold(),
        ctx.config.name,
        ctx.config.model,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "You:".cyan().bold());
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") {
            break;
        }

        ctx.turn(text).await;
    }

    println!("{} Bye.", "<<<".red().bold());
    Ok(())
}

async fn cmd_ask(cfg: ConciergeConfig, text: &str, stream: bool) -> Result<()> {
    if text.trim().is_empty() {
        bail!("nothing to ask");
    }
    let ctx = connect(cfg, stream).await?;
    match ctx.turn(text).await {
        TurnReply::Completed(_) => Ok(()),
        TurnReply::Failed(detail) => bail!("turn failed: {detail}"),
    }
}

fn cmd_status(cfg: &ConciergeConfig, config_path: &Path) -> Result<()> {
    let store = JsonFileStore::new(cfg.resolved_state_dir());
    let persisted = |kind| match store.load(kind) {
        Ok(id) => id.green().to_string(),
        Err(e) => format!("{}", e.to_string().dimmed()),
    };
    let settings = cfg.run_settings();

    println!();
    println!("{}", "=== Concierge Status ===".bold());
    println!();
    println!("  {}:  {}", "Config".bold(), config_path.display());
    println!("  {}:    {}", "Name".bold(), cfg.name);
    println!("  {}:   {}", "Model".bold(), cfg.model);
    println!("  {}: {}", "API key".bold(), colorize_key(&cfg.api_key));
    println!();
    println!("  {}:", "Runs".bold());
    println!("    Strategy:  {:?}", settings.strategy);
    println!("    Interval:  {}ms", cfg.poll_interval_ms);
    println!("    Attempts:  {}", settings.max_status_attempts);
    match settings.timeout {
        Some(t) => println!("    Timeout:   {}s", t.as_secs()),
        None => println!("    Timeout:   {}", "none".dimmed()),
    }
    println!("    Tools:     {:?}", cfg.tool_set);
    println!();
    println!("  {}:", "Session".bold());
    println!("    State dir: {}", store.dir().display());
    match &cfg.assistant_id {
        Some(id) => println!("    Assistant: {} (configured)", id),
        None => println!("    Assistant: {}", persisted(ResourceKind::Assistant)),
    }
    match &cfg.thread_id {
        Some(id) => println!("    Thread:    {} (configured)", id),
        None => println!("    Thread:    {}", persisted(ResourceKind::Thread)),
    }
    println!();
    Ok(())
}

fn cmd_tools(cfg: &ConciergeConfig) -> Result<()> {
    let registry = tools::build_registry(cfg.tool_set)?;
    let described: Vec<serde_json::Value> = registry
        .describe_all()
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.parameters.to_json_schema(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&described)?);
    Ok(())
}

fn cmd_reset(cfg: &ConciergeConfig) -> Result<()> {
    let store = JsonFileStore::new(cfg.resolved_state_dir());
    for kind in [ResourceKind::Assistant, ResourceKind::Thread] {
        store
            .forget(kind)
            .with_context(|| format!("Failed to remove {}", store.path_for(kind).display()))?;
    }
    println!(
        "{} Forgot persisted session in {}",
        "<<<".red().bold(),
        store.dir().display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Everything a turn needs.
struct ChatContext {
    config: ConciergeConfig,
    client: AssistantsClient,
    registry: ToolRegistry,
    session: Session,
    settings: agent::RunSettings,
}

/// Build the client and registry, then reuse or create the session.
async fn connect(config: ConciergeConfig, stream: bool) -> Result<ChatContext> {
    if config.api_key.is_empty() {
        bail!("no API key: set OPENAI_API_KEY or api_key in {CONFIG_FILE}");
    }

    let registry = tools::build_registry(config.tool_set)?;
    let client =
        AssistantsClient::new(&config.api_base_url, &config.api_key, config.connect_timeout())?;

    let store = JsonFileStore::new(config.resolved_state_dir());
    let spec = config.assistant_spec(registry.describe_all());
    let session = Session::establish(&client, &store, &spec, &config.session_overrides())
        .await
        .context("Failed to establish session")?;

    let mut settings = config.run_settings();
    if stream {
        settings.strategy = RunStrategy::Stream;
    }
    info!(
        "Using {:?} strategy with {} tool(s)",
        settings.strategy,
        registry.len()
    );

    Ok(ChatContext {
        config,
        client,
        registry,
        session,
        settings,
    })
}

impl ChatContext {
    /// Run one turn, print the reply, and let Ctrl-C cancel it.
    async fn turn(&self, text: &str) -> TurnReply {
        let cancel = CancellationToken::new();
        let streaming = self.settings.strategy == RunStrategy::Stream;

        let mut stdout_sink = StdoutSink::default();
        let reply = {
            let mut null_sink = NullSink;
            let sink: &mut dyn TextSink = if streaming {
                &mut stdout_sink
            } else {
                &mut null_sink
            };

            let turn = agent::run_turn(
                &self.client,
                &self.registry,
                &self.session,
                text,
                &self.settings,
                sink,
                &cancel,
            );
            tokio::pin!(turn);

            loop {
                tokio::select! {
                    reply = &mut turn => break reply,
                    _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                        warn!("Interrupted, cancelling turn");
                        cancel.cancel();
                    }
                }
            }
        };

        match &reply {
            TurnReply::Completed(reply_text) => {
                if stdout_sink.started {
                    println!();
                } else {
                    println!("{} {}", "Assistant:".green().bold(), reply_text);
                }
            }
            TurnReply::Failed(detail) => {
                if stdout_sink.started {
                    println!();
                }
                eprintln!("{} {}", "Error:".red().bold(), detail);
            }
        }
        reply
    }
}

/// Prints streamed text to stdout as it arrives.
#[derive(Default)]
struct StdoutSink {
    started: bool,
}

impl TextSink for StdoutSink {
    fn on_delta(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        if !self.started {
            let _ = write!(out, "{} ", "Assistant:".green().bold());
            self.started = true;
        }
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }

    fn on_tool_activity(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{}", text.dimmed());
        let _ = out.flush();
    }
}

fn colorize_key(key: &str) -> String {
    if key.is_empty() {
        "missing".red().to_string()
    } else {
        "set".green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_defaults_to_dot_concierge() {
        let cli = Cli::try_parse_from(["concierge", "status"]).unwrap();
        assert_eq!(cli.home, config::default_home_dir());
        assert!(cli.home.ends_with(".concierge"));

        let cli = Cli::try_parse_from(["concierge", "--home", "/tmp/c", "tools"]).unwrap();
        assert_eq!(cli.home, PathBuf::from("/tmp/c"));
    }

    #[test]
    fn test_chat_stream_flag() {
        let cli = Cli::try_parse_from(["concierge", "chat", "--stream"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { stream: true }));
    }
}
