//! Service layer for the relay.
//!
//! This module contains the per-item business logic:
//! - Page retrieval (`PageFetcher`)
//! - Listing parsing (`ListParser`)
//! - Identifier resolution (`BoardAdapter`)
//! - Title classification (`CategoryClassifier`)
//! - Body extraction (`ContentExtractor`)
//! - Summarization (`Summarizer`)
//! - Notification routing (`NotificationDispatcher`)

mod category;
mod content;
mod dispatcher;
mod fetcher;
mod parser;
mod resolver;
mod summarizer;

pub use category::CategoryClassifier;
pub use content::{ContentExtractor, normalize};
pub use dispatcher::{
    BoardChannels, Channel, DispatchReport, Message, NotificationDispatcher, NotificationSink,
    WebhookSink,
};
pub use fetcher::{HttpFetcher, PageFetcher, StaticFetcher};
pub use parser::ListParser;
pub use resolver::{BoardAdapter, ConfiguredAdapter, adapter_for, title_key};
pub use summarizer::{ChatCompletionBackend, Summarizer, SummaryBackend};
