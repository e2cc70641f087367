mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rowsync")]
#[command(about = "Keep a sheet of event rows in sync with a remote calendar")]
struct Cli {
    /// Sheet file to use instead of the configured one
    #[arg(long, global = true)]
    sheet: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send row edits to the calendar, then refresh the sheet
    Push,
    /// Import calendar events into the sheet
    Pull {
        /// Import events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Import events until this date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Show what a push would change, without writing anything
    Status,
    /// Show configuration paths and settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Push => commands::push::run(cli.sheet).await,
        Commands::Pull { from, to } => {
            commands::pull::run(cli.sheet, from.as_deref(), to.as_deref()).await
        }
        Commands::Status => commands::status::run(cli.sheet).await,
        Commands::Config => commands::config::run(),
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
