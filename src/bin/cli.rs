//! notice-relay CLI
//!
//! Local execution entry point. For scheduled AWS runs, use
//! `notice-relay-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use notice_relay::{
    error::Result,
    models::Config,
    pipeline::{Orchestrator, RunMode},
    storage::LocalStorage,
};

/// notice-relay - bulletin-board notice watcher
#[derive(Parser, Debug)]
#[command(
    name = "notice-relay",
    version,
    about = "Relays new bulletin-board notices to chat webhooks"
)]
struct Cli {
    /// Path to storage directory holding config.toml and watermarks
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one detect-and-dispatch cycle over every board
    Run {
        /// Dispatch without persisting watermarks
        #[arg(long)]
        dry_run: bool,

        /// Starting watermark for a dry run (implies --dry-run)
        #[arg(long, value_name = "ID")]
        baseline: Option<u64>,
    },

    /// Validate the configuration file
    Validate,

    /// Show configured boards and stored watermarks
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path)?;
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!(
        "Loaded {} board(s) from {}",
        config.boards.len(),
        config_path.display()
    );

    let storage = LocalStorage::new(&cli.storage_dir);

    match cli.command {
        Command::Run { dry_run, baseline } => {
            let mode = if dry_run || baseline.is_some() {
                RunMode::DryRun { baseline }
            } else {
                RunMode::Normal
            };

            let relay = Orchestrator::from_config(config, Arc::new(storage))?;
            let report = relay.run_cycle(mode).await;

            for board in &report.boards {
                match &board.error {
                    Some(e) => log::warn!("  {}: {:?} ({})", board.board, board.state, e),
                    None => log::info!(
                        "  {}: {:?}, {} new, {} delivered, watermark {:?} -> {:?}",
                        board.board,
                        board.state,
                        board.new_items,
                        board.delivered,
                        board.watermark_before,
                        board.watermark_after
                    ),
                }
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK ({} boards)", config.boards.len());
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            let stored = storage.list().await?;

            for board in &config.boards {
                let mark = stored.iter().find(|(key, _)| key == &board.key);
                match mark {
                    Some((_, mark)) => log::info!(
                        "  {} ({}): last id {:?}, {} seen title(s), updated {}",
                        board.key,
                        board.display_name,
                        mark.last_id,
                        mark.seen_titles.len(),
                        mark.updated_at
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| "never".into())
                    ),
                    None => log::info!("  {} ({}): no watermark yet", board.key, board.display_name),
                }
            }

            for (key, _) in stored
                .iter()
                .filter(|(key, _)| config.board(key).is_none())
            {
                log::warn!("  {}: stored watermark for an unconfigured board", key);
            }
        }
    }

    Ok(())
}
