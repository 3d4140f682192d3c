// src/models/board.rs

//! Static description of one monitored board.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for a single notice board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Unique key, also the watermark record name
    pub key: String,

    /// Human-readable board name shown in notifications
    pub display_name: String,

    /// URL of the listing page
    pub list_url: String,

    /// Detail page template with an `{id}` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url_template: Option<String>,

    /// How the canonical post id is pulled out of a row link
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// How rows are found on the listing page
    #[serde(default)]
    pub listing: ListingLayout,

    /// Detail-page body containers, tried in order
    #[serde(default)]
    pub content_selectors: Vec<String>,

    /// Main channel reference (environment variable name or webhook URL)
    pub main_channel: String,

    /// Category keyword to sub-channel reference
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_channels: BTreeMap<String, String>,
}

/// Identifier extraction rule for a board's row links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdStrategy {
    /// Named query parameters, the first present one wins.
    QueryParams { params: Vec<String> },

    /// A digit run somewhere in the link.
    DigitRun {
        #[serde(default)]
        pick: DigitPick,
        #[serde(default = "default_min_digits")]
        min_digits: usize,
    },

    /// Rules tried in order until one yields an id.
    Fallback { rules: Vec<IdStrategy> },
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self::DigitRun {
            pick: DigitPick::First,
            min_digits: default_min_digits(),
        }
    }
}

/// Which digit run to accept when a link carries several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitPick {
    #[default]
    First,
    /// For links that also embed menu or category numbers
    Largest,
}

fn default_min_digits() -> usize {
    1
}

/// Listing page layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListingLayout {
    /// Table rows with a title link and an optional ordinal cell.
    Table {
        #[serde(default = "default_row_selectors")]
        row_selectors: Vec<String>,
        #[serde(default = "default_title_selectors")]
        title_selectors: Vec<String>,
        #[serde(default = "default_number_selector")]
        number_selector: Option<String>,
    },

    /// Every anchor whose href contains a marker, in document order.
    Anchors {
        href_contains: String,
        #[serde(default)]
        limit: Option<usize>,
    },
}

impl Default for ListingLayout {
    fn default() -> Self {
        Self::Table {
            row_selectors: default_row_selectors(),
            title_selectors: default_title_selectors(),
            number_selector: default_number_selector(),
        }
    }
}

fn default_row_selectors() -> Vec<String> {
    vec!["tbody tr".into(), ".board_list tbody tr".into()]
}

fn default_title_selectors() -> Vec<String> {
    vec!["td.subject a".into(), "td.title a".into()]
}

fn default_number_selector() -> Option<String> {
    Some("td.num".into())
}

impl BoardConfig {
    /// All selector strings this board uses, for validation.
    pub fn selector_strings(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.content_selectors.iter().map(String::as_str).collect();
        if let ListingLayout::Table {
            row_selectors,
            title_selectors,
            number_selector,
        } = &self.listing
        {
            all.extend(row_selectors.iter().map(String::as_str));
            all.extend(title_selectors.iter().map(String::as_str));
            all.extend(number_selector.as_deref());
        }
        all
    }
}
