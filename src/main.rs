mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use assignsync_core::{ReadFailurePolicy, SyncConfig, SyncOptions};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "assignsync")]
#[command(about = "Sync upcoming assignments from a calendar feed into a Notion database")]
struct Cli {
    /// Config file (defaults to ~/.config/assignsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v for info, -vv for debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create Notion pages for upcoming assignments that are not there yet
    Sync {
        /// Abort instead of treating the database as empty when existing
        /// records cannot be read
        #[arg(long)]
        strict: bool,
    },
    /// Show what `sync` would create, without writing anything
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Fail on missing values before any network call
    let config = SyncConfig::load(cli.config.as_deref())?;
    tracing::debug!(database = %config.notion.database_id, "Loaded configuration");

    match cli.command {
        Commands::Sync { strict } => {
            let options = SyncOptions {
                read_failure: if strict {
                    ReadFailurePolicy::FailClosed
                } else {
                    ReadFailurePolicy::FailOpen
                },
                ..SyncOptions::default()
            };
            commands::sync::run(&config, options).await
        }
        Commands::Status => commands::status::run(&config).await,
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
