// src/pipeline/detect.rs

//! New-item detection against a board's watermark.

use std::collections::HashSet;

use crate::models::{NoticeId, RawRow, Watermark};
use crate::services::BoardAdapter;

/// A resolved listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: NoticeId,
    pub row: RawRow,
}

/// What a listing looked like relative to the watermark.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Every resolved, non-pinned row in listing order, deduplicated
    pub current: Vec<Candidate>,
    /// Rows not yet covered by the watermark, oldest first
    pub fresh: Vec<Candidate>,
    pub pinned: usize,
    pub unresolved: usize,
}

impl Detection {
    /// Watermark covering everything currently listed.
    pub fn baseline(&self, previous: Option<&Watermark>) -> Watermark {
        let mut mark = previous.cloned().unwrap_or_default();
        // Bottom-most first so the cap keeps the newest titles.
        for candidate in self.current.iter().rev() {
            mark.advance(&candidate.id);
        }
        mark
    }
}

/// Evaluate every row independently; an old row never ends the scan.
pub fn detect(rows: &[RawRow], adapter: &dyn BoardAdapter, watermark: &Watermark) -> Detection {
    let mut detection = Detection::default();
    let mut seen: HashSet<NoticeId> = HashSet::new();

    for row in rows {
        if row.is_pinned() {
            log::debug!("Skipping pinned row '{}'", row.title);
            detection.pinned += 1;
            continue;
        }
        let Some(id) = adapter.resolve_identifier(row) else {
            detection.unresolved += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        detection.current.push(Candidate {
            id,
            row: row.clone(),
        });
    }

    let (mut numeric, mut titled): (Vec<Candidate>, Vec<Candidate>) = detection
        .current
        .iter()
        .filter(|c| !watermark.covers(&c.id))
        .cloned()
        .partition(|c| c.id.as_numeric().is_some());

    numeric.sort_by_key(|c| c.id.as_numeric());
    // Listings run newest first, so reversing puts the oldest title first.
    titled.reverse();

    detection.fresh = numeric;
    detection.fresh.extend(titled);
    detection
}
