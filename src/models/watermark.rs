//! Persisted per-board dedup state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::NoticeId;

/// Maximum titles kept for title-id boards; oldest are dropped first.
pub const SEEN_TITLES_CAP: usize = 500;

/// Last dispatched state of one board.
///
/// `last_id` only ever grows. `seen_titles` holds normalized titles for
/// rows whose links carry no digits at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seen_titles: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Watermark {
    pub fn numeric(last_id: u64) -> Self {
        Self {
            last_id: Some(last_id),
            ..Self::default()
        }
    }

    /// Whether an id was already dispatched.
    pub fn covers(&self, id: &NoticeId) -> bool {
        match id {
            NoticeId::Numeric(n) => self.last_id.is_some_and(|last| *n <= last),
            NoticeId::Title(t) => self.seen_titles.iter().any(|seen| seen == t),
        }
    }

    /// Record an attempted id. Numeric ids never move the watermark down.
    pub fn advance(&mut self, id: &NoticeId) {
        match id {
            NoticeId::Numeric(n) => {
                self.last_id = Some(self.last_id.map_or(*n, |last| last.max(*n)));
            }
            NoticeId::Title(t) => {
                if !self.seen_titles.iter().any(|seen| seen == t) {
                    self.seen_titles.push(t.clone());
                }
                if self.seen_titles.len() > SEEN_TITLES_CAP {
                    let excess = self.seen_titles.len() - SEEN_TITLES_CAP;
                    self.seen_titles.drain(..excess);
                }
            }
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
