mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farewatch_core::FarewatchConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "farewatch")]
#[command(about = "Fill in missing airport codes on your flight-price sheet")]
struct Cli {
    /// Config file (defaults to ~/.config/farewatch/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up and write back airport codes for rows that don't have one (default)
    Sync,
    /// Resolve a single city without touching the sheet
    Lookup { city: String },
    /// Append a row to the sheet (needs sheet.variant = "append")
    Add {
        city: String,

        /// IATA code, if already known
        #[arg(long)]
        iata: Option<String>,

        /// Extra column, e.g. --set lowestPrice=54 (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, serde_json::Value)>,
    },
}

/// Used when `RUST_LOG` is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "farewatch=info,farewatch_core=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config =
        FarewatchConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => commands::sync::run(&config).await,
        Commands::Lookup { city } => commands::lookup::run(&config, &city).await,
        Commands::Add { city, iata, fields } => {
            commands::add::run(&config, city, iata, fields).await
        }
    }
}

/// Parse `KEY=VALUE`, reading VALUE as JSON when it parses and as a string otherwise.
fn parse_field(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing column name in '{s}'"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    Ok((key.to_string(), value))
}
