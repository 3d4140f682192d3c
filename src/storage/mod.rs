//! Watermark persistence.
//!
//! One JSON record per board, keyed by the board key:
//!
//! ```text
//! storage/
//! ├── config.toml            # Relay configuration
//! └── state/
//!     ├── knu-academic.json  # {"last_id":1336485,"updated_at":"..."}
//!     └── dept-news.json     # {"seen_titles":["..."],"updated_at":"..."}
//! ```

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Watermark;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Storage key of a board's watermark record.
pub fn state_key(board_key: &str) -> String {
    format!("state/{}.json", board_key)
}

/// Durable per-board watermark store.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Stored watermark, `None` when the board has never run.
    async fn get(&self, board_key: &str) -> Result<Option<Watermark>>;

    /// Replace the stored watermark.
    async fn set(&self, board_key: &str, watermark: &Watermark) -> Result<()>;
}
