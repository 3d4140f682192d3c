//! Notice data structures produced during one cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Canonical post identifier.
///
/// Numeric ids are ordered against the board watermark. Title ids are
/// opaque and only ever checked for membership in the seen-set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoticeId {
    Numeric(u64),
    Title(String),
}

impl NoticeId {
    /// Numeric value, if this id is orderable.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Title(_) => None,
        }
    }
}

impl fmt::Display for NoticeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Title(t) => write!(f, "title:{t}"),
        }
    }
}

/// One row of a listing page, before id resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Zero-based position on the listing page
    pub position: usize,

    /// Title text, whitespace-trimmed
    pub title: String,

    /// Raw link attribute, possibly relative
    pub href: String,

    /// Text of the ordinal/number cell, when the layout has one
    pub ordinal: Option<String>,
}

impl RawRow {
    /// Pinned rows carry an ordinal cell without a plain sequence number.
    pub fn is_pinned(&self) -> bool {
        match &self.ordinal {
            Some(text) => {
                let text = text.trim();
                text.is_empty() || !text.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }
}

/// A post that has been resolved and classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub id: NoticeId,
    pub title: String,
    pub category: Option<Category>,
    pub url: String,
    pub content: Option<Content>,
    pub summary: Option<Summary>,
}

impl NoticeItem {
    pub fn new(id: NoticeId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category: None,
            url: url.into(),
            content: None,
            summary: None,
        }
    }
}

/// Outcome of detail-page extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Page fetched but no block passed the thresholds
    NotFound,
    /// Page could not be fetched
    FetchFailed,
}

impl Content {
    pub const NOT_FOUND: &'static str = "(본문을 찾을 수 없습니다)";
    pub const FETCH_FAILED: &'static str = "(본문을 불러오지 못했습니다)";

    /// Extracted text, `None` for either sentinel.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(t) => t,
            Self::NotFound => Self::NOT_FOUND,
            Self::FetchFailed => Self::FETCH_FAILED,
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the notification body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Produced by the summarization backend
    Summary,
    /// Content short enough to send as-is
    Original,
    /// Truncated raw content after a summarization failure
    Preview,
    /// No body could be extracted; the text explains why
    Unavailable,
}

impl Provenance {
    /// Footer label, if the body deserves one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Summary => Some("AI 요약"),
            Self::Original => Some("본문"),
            Self::Preview => Some("본문 미리보기"),
            Self::Unavailable => None,
        }
    }
}

/// Text to show in a notification, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub provenance: Provenance,
}

impl Summary {
    pub fn new(text: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            text: text.into(),
            provenance,
        }
    }
}
