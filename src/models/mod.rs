// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod board;
mod config;
mod notice;
mod watermark;

// Re-export all public types
pub use board::{BoardConfig, DigitPick, IdStrategy, ListingLayout};
pub use config::{
    CategoryKeyword, Config, ContentConfig, CrawlerConfig, FirstRun, NotifyConfig, SummaryConfig,
    parse_selector,
};
pub use notice::{Content, NoticeId, NoticeItem, Provenance, RawRow, Summary};
pub use watermark::{SEEN_TITLES_CAP, Watermark};

/// Category resolved from a notice title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Token as it appeared in the title (e.g. "취업")
    pub label: String,

    /// Routing tag from the vocabulary, or the label itself when unmapped
    pub tag: String,
}
