//! Community Graph - StackExchange importer
//!
//! Pulls questions for a tag set into Neo4j.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use community_graph::{importer, Config};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "community-graph")]
#[command(about = "Import StackExchange questions into a Neo4j community graph")]
struct Cli {
    /// Path to the YAML config file (defaults to ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every question carrying all of the given tags
    Import {
        /// Tag to filter on (repeatable; questions must carry all of them)
        #[arg(short, long = "tag", required = true)]
        tags: Vec<String>,

        /// Only questions created at or after this date (YYYY-MM-DD, RFC 3339 or epoch seconds)
        #[arg(long, value_parser = parse_date)]
        from: Option<DateTime<Utc>>,

        /// Only questions created before this date
        #[arg(long, value_parser = parse_date)]
        to: Option<DateTime<Utc>>,

        /// Results per page (1-100)
        #[arg(long)]
        page_size: Option<u32>,

        /// StackExchange API key (overrides config and STACKEXCHANGE_KEY)
        #[arg(long, env = "STACKEXCHANGE_KEY", hide_env_values = true)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,community_graph=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            tags,
            from,
            to,
            page_size,
            key,
        } => {
            if let Some(page_size) = page_size {
                config.page_size = page_size;
            }
            if let Some(key) = key {
                config.api_key = key;
            }
            importer::import_tags(&config, &tags, from, to).await?;
            Ok(())
        }
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(epoch) = value.parse::<i64>() {
        return DateTime::from_timestamp(epoch, 0)
            .ok_or_else(|| format!("epoch seconds out of range: {value}"));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("expected YYYY-MM-DD, RFC 3339 or epoch seconds, got {value:?}"))
}
