//! larder command line entry point.
//!
//! Drives the offline cache controller by hand: install and activate a
//! version, sync on a timer, fetch single URLs through the serve policy,
//! and inspect or purge the cache. Logging goes to stderr; command
//! output goes to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use larder_core::{AppConfig, RequestMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Offline cache controller for a static site")]
#[command(version)]
struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every core asset into the current version's generation
    Install,
    /// Prune old generations and claim control for the current version
    Activate,
    /// Install and activate unless the current version is already in control
    Sync {
        /// Keep running and re-check on an interval
        #[arg(long)]
        watch: bool,

        /// Seconds between checks in watch mode
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
    },
    /// Fetch one URL through the serve policy and print the body
    Get {
        /// Absolute URL or site-relative path like ./styles.css
        url: String,

        /// Treat the request as a page navigation
        #[arg(long, conflicts_with = "subresource")]
        navigate: bool,

        /// Treat the request as a subresource
        #[arg(long)]
        subresource: bool,

        /// Write the body to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show cache generations, entry counts, and the controller
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete every cache generation and drop the controller claim
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Install => commands::lifecycle::install(&config).await,
        Command::Activate => commands::lifecycle::activate(&config).await,
        Command::Sync { watch, interval_secs } => commands::lifecycle::sync(&config, watch, interval_secs).await,
        Command::Get { url, navigate, subresource, output } => {
            let mode = if navigate {
                Some(RequestMode::Navigate)
            } else if subresource {
                Some(RequestMode::Subresource)
            } else {
                None
            };
            commands::get::run(&config, &url, mode, output.as_deref()).await
        }
        Command::Status { json } => commands::status::run(&config, json).await,
        Command::Purge => commands::purge::run(&config).await,
    }
}
