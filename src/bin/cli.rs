//! nfbot CLI
//!
//! Polls the configured Nitter and Bibliogram mirrors and relays new items to Telegram.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nfbot::{
    error::Result,
    models::{Config, Source},
    pipeline::{self, ChangeDetector, SourceOutcome},
    storage::{LocalStateStore, StateStore},
};

/// nfbot - Twitter/Instagram to Telegram notification bot
#[derive(Parser, Debug)]
#[command(
    name = "nfbot",
    version,
    about = "Relay new tweets and Instagram posts to a Telegram channel"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll forever
    Run,

    /// Run a single poll cycle
    Once,

    /// Validate configuration
    Validate,

    /// Show the last-seen items
    State,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let found = cli.config.exists();
    let mut config = if found {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    config.apply_env();
    init_logging(cli.verbose, &config.logging.level);

    if found {
        log::info!("Loaded configuration from {}", cli.config.display());
    } else {
        log::warn!("No configuration at {}, using defaults", cli.config.display());
    }

    match cli.command {
        Command::Run => {
            config.validate()?;
            let detector = ChangeDetector::from_config(&config)?;
            let delay = Duration::from_secs(config.poll.delay_secs);

            log::info!("Polling every {}s", config.poll.delay_secs);
            pipeline::run_poll_loop(&detector, delay, None).await;
        }

        Command::Once => {
            config.validate()?;
            let detector = ChangeDetector::from_config(&config)?;
            let report = detector.run_cycle().await;

            for (source, result) in &report.results {
                match result {
                    Ok(SourceOutcome::Delivered { item, kind }) => log::info!(
                        "{source}: delivered {} as {:?}",
                        item.link().canonical_url(),
                        kind
                    ),
                    Ok(outcome) => log::info!("{source}: {outcome:?}"),
                    Err(_) => log::info!("{source}: failed"),
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            match config.validate_delivery() {
                Ok(()) => log::info!("✓ Telegram settings OK"),
                Err(e) => log::warn!("{e}"),
            }

            for source in Source::ALL {
                let account = config.source(source);
                match account.handle() {
                    Some(handle) => log::info!(
                        "{source}: watching '{handle}' through {} mirror(s)",
                        account.mirrors.len()
                    ),
                    None => log::info!("{source}: disabled"),
                }
            }
        }

        Command::State => {
            let store = LocalStateStore::new(&config.state.path);
            let state = store.read().await?;
            log::info!("State file: {}", store.path().display());

            for source in Source::ALL {
                match state.get(source) {
                    Some(item) => {
                        log::info!("Last {}: {}", source.slot_key(), item.link().canonical_url());
                        log::info!("    {}", item.description());
                    }
                    None => log::info!("Last {}: none", source.slot_key()),
                }
            }
        }
    }

    Ok(())
}
