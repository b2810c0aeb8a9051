//! Tool tester: function-calling playground.
//!
//! Usage:
//!   tool-tester serve              Start the web UI and JSON API
//!   tool-tester chat               Interactive chat with tool execution
//!   tool-tester ask "<query>"      One round trip, propose only (add --execute to run tools)
//!   tool-tester tools              Print the default tool catalog
//!   tool-tester init               Write a default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;

use tool_tester::agent::Orchestrator;
use tool_tester::catalog::{default_catalog, ToolCatalog};
use tool_tester::chat;
use tool_tester::config::{self, TesterConfig};
use tool_tester::gateway::OpenAiGateway;
use tool_tester::server::{self, AppState, CatalogSource};
use tool_tester::tools::{self, ToolResolver};
use tool_tester::types::Mode;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "tool-tester")]
#[command(version)]
#[command(about = "Inspect and exercise LLM function calling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file.
    #[arg(long, default_value = "~/.tool-tester/config.toml")]
    config: String,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web UI and JSON API.
    Serve {
        /// Bind address, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Interactive chat; proposed tools are executed.
    Chat,

    /// Run a single query and print the proposed calls.
    Ask {
        query: String,

        /// Execute the proposed calls and print the synthesized answer.
        #[arg(long)]
        execute: bool,
    },

    /// Print the catalog of locally executable tools as JSON.
    Tools,

    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = PathBuf::from(shellexpand::tilde(&cli.config).into_owned());

    let mut cfg = config::load_with_env(&config_path, |key| std::env::var(key).ok())
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.bind_addr = bind;
            }
            cmd_serve(cfg).await
        }
        Commands::Chat => cmd_chat(&cfg).await,
        Commands::Ask { query, execute } => cmd_ask(&cfg, &query, execute).await,
        Commands::Tools => cmd_tools(),
        Commands::Init { force } => cmd_init(&config_path, force),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(cfg: TesterConfig) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(&cfg)?);
    let state = AppState::new(orchestrator, CatalogSource::from_config(&cfg));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} Shutting down gracefully...", "<<<".red().bold());
            signal_cancel.cancel();
        }
    });

    server::serve(&cfg, state, cancel).await
}

async fn cmd_chat(cfg: &TesterConfig) -> Result<()> {
    let orchestrator = build_orchestrator(cfg)?;
    let catalog = ToolCatalog::default();

    println!(
        "{} Chatting with {} ({} tools)",
        ">>>".green().bold(),
        orchestrator.model(),
        catalog.get().len()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    chat::run_chat(&orchestrator, &catalog, stdin, tokio::io::stdout()).await
}

async fn cmd_ask(cfg: &TesterConfig, query: &str, execute: bool) -> Result<()> {
    let orchestrator = build_orchestrator(cfg)?;
    let mode = if execute { Mode::Autonomous } else { Mode::Test };
    let catalog = default_catalog();

    let result = orchestrator
        .round_trip(query, &catalog, mode)
        .await
        .context("Round trip failed")?;

    println!("{}", "Model message:".bold());
    println!("  {}", result.model_message.as_deref().unwrap_or("(none)"));
    println!("{}", "Function calls:".bold());
    if result.proposed_calls.is_empty() {
        println!("  (none)");
    }
    for call in &result.proposed_calls {
        println!(
            "  {}({})",
            call.name.yellow(),
            serde_json::Value::Object(call.arguments.clone())
        );
    }
    if mode == Mode::Autonomous {
        println!("{}", "Answer:".bold());
        println!("  {}", result.final_message.as_deref().unwrap_or("(none)"));
    }
    Ok(())
}

fn cmd_tools() -> Result<()> {
    let resolver = ToolResolver::with_defaults(tools::entropy_rng());
    let json = serde_json::to_string_pretty(&resolver.definitions())
        .context("Failed to serialize tool catalog")?;
    println!("{}", json);
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }
    config::save_config(&TesterConfig::default(), config_path)?;
    println!("Wrote default config to {}", config_path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_orchestrator(cfg: &TesterConfig) -> Result<Orchestrator> {
    if cfg.api_key.is_empty() {
        anyhow::bail!(
            "No API key configured. Set OPENAI_API_KEY or api_key in {}",
            config::default_config_path().display()
        );
    }

    let gateway = OpenAiGateway::new(&cfg.api_base_url, &cfg.api_key)
        .with_sampling(cfg.max_tokens, cfg.temperature);
    let resolver = ToolResolver::with_defaults(tools::entropy_rng());

    info!("Using model {} at {}", cfg.model, cfg.api_base_url);
    Ok(Orchestrator::new(Arc::new(gateway), resolver, &cfg.model).with_unit_hint(cfg.default_unit))
}
