// crates/wordlink-cli/src/main.rs
//
// CLI entrypoint for Wordlink.
//
// Initializes tracing, parses arguments, loads configuration, builds the
// embedding cache over the configured data source, and dispatches to the
// pair, daily, similarity, hint and play subcommands.

mod commands;
mod config;
mod context;
mod output;

use clap::{Parser, Subcommand};
use commands::daily::DailyCmd;
use commands::hint::HintCmd;
use commands::pair::PairCmd;
use commands::play::PlayCmd;
use commands::similarity::SimilarityCmd;
use config::WordlinkConfig;
use context::AppContext;
use output::OutputFormat;
use wordlink_store::VectorLayout;

/// Wordlink: chain words from a start word to a target word.
#[derive(Parser, Debug)]
#[command(
    name = "wordlink",
    version = "0.1.0",
    about = "Word-association chain game over word embeddings"
)]
struct Cli {
    /// Path to the TOML configuration file (default: ~/.wordlink/config.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Local data directory (overrides the config file).
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Remote data directory URL (overrides the config file).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Vector layout: sharded or per-word (overrides the config file).
    #[arg(long, global = true, value_parser = parse_layout)]
    layout: Option<VectorLayout>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Pick a random start/target pair.
    Pair(PairCmd),

    /// Show today's shared pair.
    Daily(DailyCmd),

    /// Similarity and progress between two words.
    Similarity(SimilarityCmd),

    /// Suggest the next word for a chain.
    Hint(HintCmd),

    /// Play interactively.
    Play(PlayCmd),
}

fn parse_layout(value: &str) -> Result<VectorLayout, String> {
    match value {
        "sharded" => Ok(VectorLayout::Sharded),
        "per_word" | "per-word" => Ok(VectorLayout::PerWord),
        other => Err(format!("unknown layout \"{}\" (expected sharded or per_word)", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Logged once the subscriber is up.
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let loaded = WordlinkConfig::load(&config_path);
    let mut wordlink_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => WordlinkConfig::default(),
    };

    // Initialize tracing subscriber for structured logging. RUST_LOG wins
    // over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&wordlink_config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI flags override the config file values.
    if let Some(dir) = &cli.data_dir {
        wordlink_config.data_dir = dir.clone();
        wordlink_config.base_url = None;
    }
    if let Some(url) = &cli.base_url {
        wordlink_config.base_url = Some(url.clone());
    }
    if let Some(layout) = cli.layout {
        wordlink_config.vector_layout = layout;
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let ctx = AppContext::new(wordlink_config, format)?;

    match &cli.command {
        Commands::Pair(cmd) => commands::pair::run(&ctx, cmd).await?,
        Commands::Daily(cmd) => commands::daily::run(&ctx, cmd).await?,
        Commands::Similarity(cmd) => commands::similarity::run(&ctx, cmd).await?,
        Commands::Hint(cmd) => commands::hint::run(&ctx, cmd).await?,
        Commands::Play(cmd) => commands::play::run(&ctx, cmd).await?,
    }

    Ok(())
}
