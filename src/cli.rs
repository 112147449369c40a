///
/// This module implements the CLI for timeline-relay: command parsing, wiring
/// the concrete clients into the core relay, and the top-level run entrypoint.
///
/// All pipeline logic (filtering, truncation, cursor handling, pacing) lives in
/// the `timeline-relay-core` crate. This module is strictly glue.
///
/// ## How To Use
/// - From the shell: `timeline-relay run --config config.json`
/// - Programmatically or from tests: call [`run`] with a constructed [`Cli`].
use crate::load_config::{load_config, resolve_config_path, AppConfig};
use crate::publish::TwitterClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timeline_relay_core::contract::SystemClock;
use timeline_relay_core::relay::Relay;
use timeline_relay_core::source::WeiboTimeline;

/// CLI for timeline-relay: forward matching timeline posts to another platform.
#[derive(Parser)]
#[clap(
    name = "timeline-relay",
    version,
    about = "Poll a Weibo timeline, filter it by keyword and forward matches to Twitter"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed the cursor, then poll and forward until killed
    Run {
        /// Path to the JSON or YAML config file (default: $CONFIG or config.json)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Stop after this many poll cycles
        #[clap(long)]
        max_cycles: Option<u64>,
    },
    /// Verify credentials and perform the seed fetch, then exit
    Check {
        /// Path to the JSON or YAML config file (default: $CONFIG or config.json)
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

type LiveRelay = Relay<WeiboTimeline, TwitterClient, SystemClock>;

/// Build the relay from config and bring it to the running state:
/// credentials verified and cursor seeded.
async fn start_relay(config: &AppConfig) -> Result<LiveRelay> {
    let source = WeiboTimeline::new(
        config.credentials.weibo_access_token.clone(),
        &config.settings.source,
    )?;
    let publisher = TwitterClient::new(&config.credentials, &config.settings.sink)?;
    let mut relay = Relay::new(
        source,
        publisher,
        SystemClock,
        Box::new(config.settings.filter.clone()),
        &config.settings,
    );

    let account = relay
        .start()
        .await
        .context("Failed to verify destination credentials")?;
    println!("Logged in as: {}", account.name);
    Ok(relay)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Run { config, max_cycles } => {
            let config = load_config(resolve_config_path(config))?;
            tracing::info!(command = "run", ?max_cycles, "Starting relay");
            let mut relay = start_relay(&config).await?;
            println!("Initial ID set: {}", relay.cursor());

            let summary = relay.run(max_cycles).await;
            tracing::info!(
                command = "run",
                cycles = summary.cycles,
                forwarded = summary.forwarded,
                failed = summary.failed,
                "Relay stopped"
            );
            println!(
                "Relay stopped after {} cycles: {} forwarded, {} failed",
                summary.cycles, summary.forwarded, summary.failed
            );
            Ok(())
        }
        Commands::Check { config } => {
            let config = load_config(resolve_config_path(config))?;
            tracing::info!(command = "check", "Checking credentials and timeline access");
            let relay = start_relay(&config).await?;
            println!("Initial ID set: {}", relay.cursor());
            Ok(())
        }
    }
}
