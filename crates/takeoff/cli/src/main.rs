//! Takeoff CLI - quantity rules and auto-tuning from the terminal
//!
//! - Evaluate a single rule expression against ad-hoc bindings
//! - Generate a priced quote from a JSON seed (catalog + rules)
//! - Replay recorded quote edits and print what the tuner learned
//! - List the rules of a seed

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use takeoff_engine::{EngineConfig, InMemoryCatalog, SeedData, Stores, TakeoffService};
use takeoff_tuning::JsonlAdjustmentLog;
use takeoff_types::{Binding, ProfileId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{eval, generate, replay, rules};
use output::OutputFormat;

/// Takeoff CLI
#[derive(Parser)]
#[command(name = "takeoff")]
#[command(about = "Takeoff - sandboxed quantity rules and auto-tuning", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TAKEOFF_CONFIG")]
    config: Option<String>,

    /// Seed file with price profiles and rules (JSON)
    #[arg(short, long, env = "TAKEOFF_SEED")]
    seed: Option<String>,

    /// Append adjustments to this JSON-lines file instead of memory
    #[arg(long, env = "TAKEOFF_ADJUSTMENT_LOG")]
    adjustment_log: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "TAKEOFF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Evaluate one expression
    Eval {
        /// Expression, e.g. "8 + 2*areaM2"
        expression: String,

        /// Variable binding `name=value` (repeatable)
        #[arg(short, long = "var", value_parser = eval::parse_binding)]
        vars: Vec<(String, Binding)>,
    },

    /// Generate a quote from project requirements
    Generate(generate::GenerateArgs),

    /// Replay recorded edits and print learned insights
    Replay {
        /// Replay file (JSON array of quotes with edits)
        file: String,

        /// Price profile for quotes that do not name one
        #[arg(long, default_value = "default")]
        profile: String,
    },

    /// List the rules installed from the seed
    Rules,

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref())?;

    // Initialize tracing; logs go to stderr so JSON output stays clean
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json_logs || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Commands::Eval { expression, vars } => {
            eval::execute(&expression, vars, &config.limits, cli.output)
        }
        Commands::Config => output::print_json(&config),
        Commands::Generate(args) => {
            let (service, seed) = build_service(cli.seed.as_deref(), cli.adjustment_log.as_deref(), config).await?;
            generate::execute(&service, &seed.tenant, &args, cli.output).await
        }
        Commands::Replay { file, profile } => {
            let contents = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading replay file {}", file))?;
            let quotes = replay::parse_replay(&contents)
                .with_context(|| format!("parsing replay file {}", file))?;

            let (service, seed) = build_service(cli.seed.as_deref(), cli.adjustment_log.as_deref(), config).await?;
            replay::execute(&service, &seed.tenant, quotes, &ProfileId::new(profile), cli.output)
                .await
        }
        Commands::Rules => {
            let (service, seed) = build_service(cli.seed.as_deref(), cli.adjustment_log.as_deref(), config).await?;
            rules::execute(&service, &seed.tenant, cli.output).await
        }
    }
}

/// In-memory service holding the seed, optionally with a file-backed adjustment log
async fn build_service(
    seed_path: Option<&str>,
    adjustment_log: Option<&str>,
    config: EngineConfig,
) -> anyhow::Result<(TakeoffService, SeedData)> {
    let seed_path = seed_path.context("a seed file is required (--seed or TAKEOFF_SEED)")?;
    let contents = tokio::fs::read_to_string(seed_path)
        .await
        .with_context(|| format!("reading seed file {}", seed_path))?;
    let seed = SeedData::from_json(&contents)?;

    let catalog = Arc::new(InMemoryCatalog::new());
    seed.populate_catalog(&catalog).await;

    let mut stores = Stores {
        catalog,
        ..Stores::in_memory()
    };
    if let Some(path) = adjustment_log {
        stores.log = Arc::new(JsonlAdjustmentLog::open(path).await?);
    }

    let service = TakeoffService::new(stores, config)?;
    let installed = seed.install_rules(&service).await?;
    tracing::debug!(tenant = %seed.tenant, rules = installed, "seed installed");

    Ok((service, seed))
}
