// src/lambda/mod.rs

//! AWS Lambda handler for scheduled relay cycles.
//!
//! Each invocation:
//! 1. Loads `config.toml` from S3 (or a bundled file, or built-in defaults)
//! 2. Runs one cycle with S3-backed watermarks
//! 3. Returns the cycle report as the response payload

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{CycleReport, Orchestrator, RunMode};
use crate::storage::S3Storage;

/// Lambda invocation payload. Scheduled events carry none of these
/// fields and run a normal cycle.
#[derive(Debug, Default, Deserialize)]
pub struct RelayRequest {
    /// Dispatch without persisting watermarks
    #[serde(default)]
    pub dry_run: bool,

    /// Starting watermark for a dry run
    pub baseline: Option<u64>,
}

impl RelayRequest {
    pub fn mode(&self) -> RunMode {
        if self.dry_run || self.baseline.is_some() {
            RunMode::DryRun {
                baseline: self.baseline,
            }
        } else {
            RunMode::Normal
        }
    }
}

/// Lambda response payload.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CycleReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<RelayRequest>,
) -> std::result::Result<RelayResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();
    info!("Starting relay cycle: {:?}", request.mode());

    match run_cycle(&request).await {
        Ok(report) => {
            info!(
                "Cycle completed: {} new item(s), {} failed board(s)",
                report.new_items(),
                report.failed_boards()
            );
            Ok(RelayResponse {
                success: true,
                report: Some(report),
                error: None,
                execution_time_ms: start.elapsed().as_millis() as u64,
            })
        }
        Err(e) => {
            error!("Relay cycle failed: {}", e);
            Ok(RelayResponse {
                success: false,
                report: None,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
            })
        }
    }
}

async fn run_cycle(request: &RelayRequest) -> Result<CycleReport> {
    let storage = S3Storage::from_env().await?;
    let config = load_lambda_config(&storage).await?;

    let relay = Orchestrator::from_config(config, Arc::new(storage))?;
    Ok(relay.run_cycle(request.mode()).await)
}

/// Config from S3, then `CONFIG_PATH`, then defaults, with environment
/// overrides applied last.
async fn load_lambda_config(storage: &S3Storage) -> Result<Config> {
    let mut config = match storage.read_bytes(&storage.config_key()).await? {
        Some(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            toml::from_str(&text)?
        }
        None => {
            let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
            Config::load_or_default(path)?
        }
    };

    apply_env_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Some(secs) = env_number("CRAWL_TIMEOUT_SECS") {
        config.crawler.timeout_secs = secs;
    }
    if let Some(ms) = env_number("ITEM_DELAY_MS") {
        config.crawler.item_delay_ms = ms;
    }
}

fn env_number(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}
