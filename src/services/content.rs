// src/services/content.rs

//! Detail-page body extraction.
//!
//! Configured selectors are tried first. When none of them yields real
//! text, the densest block on the page is taken instead, provided it is
//! large enough not to be navigation or footer boilerplate.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::Result;
use crate::models::{Content, ContentConfig, parse_selector};
use crate::services::PageFetcher;
use crate::utils::text::{normalize_whitespace, visible_len};

/// Elements that start a new line in extracted text.
const BREAK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "article", "blockquote", "pre", "ul", "ol", "dl", "dt", "dd",
];

/// Elements whose text is never content.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A child block holding this share of its parent's text replaces it.
const DESCEND_RATIO: f64 = 0.8;

/// Symbols that always open a bullet.
const BULLET_SYMBOLS: &[char] = &['•', '·', '※', '○', '●', '■', '□', '▶', '◆', '◇', '▪'];

/// Punctuation that closes a sentence before an ordered marker.
const SENTENCE_END: &[char] = &['.', '!', '?', '。'];

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s+(\d{1,2}[.)]\s|[가나다라마바사아자차카타파하][.)]\s|[a-z][.)]\s|-\s|[•·※○●■□▶◆◇▪]\s?)",
    )
    .expect("static regex")
});

static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.$").expect("static regex"));

/// Extracts normalized body text from detail pages.
#[derive(Debug)]
pub struct ContentExtractor {
    block_selector: Selector,
    min_selector_chars: usize,
    min_block_chars: usize,
}

impl ContentExtractor {
    pub fn new(config: &ContentConfig) -> Result<Self> {
        Ok(Self {
            block_selector: parse_selector(&config.block_selector)?,
            min_selector_chars: config.min_selector_chars,
            min_block_chars: config.min_block_chars,
        })
    }

    /// Fetch a detail page and extract its body. Never fails.
    pub async fn fetch(&self, fetcher: &dyn PageFetcher, url: &str, selectors: &[String]) -> Content {
        match fetcher.fetch(url).await {
            Ok(html) => self.extract(&html, selectors),
            Err(e) => {
                log::warn!("Failed to fetch detail page {}: {}", url, e);
                Content::FetchFailed
            }
        }
    }

    /// Extract body text from detail-page markup.
    pub fn extract(&self, html: &str, selectors: &[String]) -> Content {
        let document = Html::parse_document(html);

        for source in selectors {
            let selector = match parse_selector(source) {
                Ok(sel) => sel,
                Err(e) => {
                    log::warn!("Skipping content selector: {}", e);
                    continue;
                }
            };
            let hit = document
                .select(&selector)
                .map(|el| normalize(&block_text(el)))
                .find(|text| visible_len(text) >= self.min_selector_chars);
            if let Some(text) = hit {
                log::debug!("Content matched selector '{}'", source);
                return Content::Text(text);
            }
        }

        match self.densest_block(&document) {
            Some(text) => Content::Text(text),
            None => Content::NotFound,
        }
    }

    /// Largest candidate block above the threshold, narrowed to the
    /// innermost block that still holds most of its text.
    fn densest_block(&self, document: &Html) -> Option<String> {
        let scored: Vec<(ElementRef, String, usize)> = document
            .select(&self.block_selector)
            .map(|el| {
                let text = block_text(el);
                let score = visible_len(&text);
                (el, text, score)
            })
            .collect();

        let mut best = scored
            .iter()
            .enumerate()
            .filter(|(_, (_, _, score))| *score >= self.min_block_chars)
            .max_by_key(|(idx, (_, _, score))| (*score, std::cmp::Reverse(*idx)))
            .map(|(idx, _)| idx)?;

        loop {
            let (parent, _, parent_score) = &scored[best];
            let threshold = (*parent_score as f64 * DESCEND_RATIO).ceil() as usize;
            let inner = scored
                .iter()
                .enumerate()
                .filter(|(_, (el, _, score))| {
                    *score >= threshold
                        && el != parent
                        && el.ancestors().any(|a| a == **parent)
                })
                .max_by_key(|(idx, (_, _, score))| (*score, std::cmp::Reverse(*idx)))
                .map(|(idx, _)| idx);

            match inner {
                Some(idx) => best = idx,
                None => break,
            }
        }

        let (_, text, score) = &scored[best];
        log::debug!("Content taken from densest block ({} chars)", score);
        Some(normalize(text))
    }
}

/// Text of an element with line breaks at block boundaries.
fn block_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                let skipped = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| SKIP_TAGS.contains(&name));
                if !skipped {
                    out.push_str(text);
                }
            }
            Node::Element(el) if BREAK_TAGS.contains(&el.name()) => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Normalize extracted text into roughly document-shaped lines.
///
/// Whitespace runs inside a line collapse to one space, leading and
/// trailing blank lines go, and three or more blank lines shrink to
/// one. Single-line text gets breaks before list and bullet markers.
pub fn normalize(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in raw.lines().map(normalize_whitespace) {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !lines.is_empty() {
            let keep = if blank_run >= 3 { 1 } else { blank_run };
            lines.extend(std::iter::repeat_n(String::new(), keep));
        }
        blank_run = 0;
        lines.push(line);
    }

    match lines.as_slice() {
        [single] => split_bullets(single),
        _ => lines.join("\n"),
    }
}

fn split_bullets(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 16);
    let mut last = 0;
    for caps in LIST_MARKER.captures_iter(line) {
        let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !opens_item(&line[..whole.start()], marker.as_str()) {
            continue;
        }
        out.push_str(&line[last..whole.start()]);
        out.push('\n');
        last = marker.start();
    }
    out.push_str(&line[last..]);
    out
}

/// Whether a marker starts a new item given the text before it.
///
/// Ordered markers and dashes need a finished sentence in front of them,
/// and a bare number like the `2025.` of `2025. 3. 4.` never counts as one.
fn opens_item(before: &str, marker: &str) -> bool {
    if marker.starts_with(BULLET_SYMBOLS) {
        return true;
    }
    match before.split_whitespace().next_back() {
        None => true,
        Some(token) => token.ends_with(SENTENCE_END) && !NUMBER_RUN.is_match(token),
    }
}
