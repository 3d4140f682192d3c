//! AWS Lambda entry point for notice-relay
//!
//! Deploy with `cargo lambda build --release --features lambda` and
//! attach a schedule rule.
//!
//! ## Environment Variables
//!
//! - `S3_BUCKET`: Bucket holding `config.toml` and watermarks (required)
//! - `S3_PREFIX`: Key prefix (default: `notice-relay`)
//! - `CONFIG_PATH`: Bundled config used when S3 has none
//! - `CRAWL_TIMEOUT_SECS`, `ITEM_DELAY_MS`: Config overrides
//! - `DISCORD_WEBHOOK`, `OPENAI_API_KEY`: Channel and summarizer secrets
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("notice-relay Lambda starting...");
    lambda_runtime::run(service_fn(notice_relay::lambda::handler)).await
}
