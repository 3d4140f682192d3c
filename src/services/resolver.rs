// src/services/resolver.rs

//! Canonical identifier resolution.
//!
//! Each site family embeds its post id differently, so resolution lives
//! behind `BoardAdapter`. The adapter for a board is chosen from its
//! configured `IdStrategy`; the title fallback is shared by all of them.

use crate::models::{BoardConfig, DigitPick, IdStrategy, NoticeId, RawRow};
use crate::utils::resolve;
use crate::utils::text::normalize_whitespace;
use crate::utils::url::{digit_runs, has_digits, query_param};

/// Per-site-family behavior the pipeline needs from a board.
pub trait BoardAdapter: Send + Sync {
    /// Canonical id for a row, `None` when the row must be skipped.
    fn resolve_identifier(&self, row: &RawRow) -> Option<NoticeId>;

    /// Absolute detail-page URL for a resolved row.
    fn build_detail_url(&self, id: &NoticeId, row: &RawRow) -> String;

    /// Detail-page body selectors, in priority order.
    fn content_selectors(&self) -> &[String];
}

/// A single id extraction rule.
trait IdRule: Send + Sync {
    fn extract(&self, base: &str, href: &str) -> Option<u64>;
}

/// Named query parameters, e.g. `btin_idx` or `nttId`.
struct QueryParamRule {
    params: Vec<String>,
}

impl IdRule for QueryParamRule {
    fn extract(&self, base: &str, href: &str) -> Option<u64> {
        query_param(base, href, &self.params)?.trim().parse().ok()
    }
}

/// A digit run in the raw link.
struct DigitRunRule {
    pick: DigitPick,
    min_digits: usize,
}

impl IdRule for DigitRunRule {
    fn extract(&self, _base: &str, href: &str) -> Option<u64> {
        let mut candidates = digit_runs(href)
            .into_iter()
            .filter(|run| run.len() >= self.min_digits)
            .filter_map(|run| run.parse::<u64>().ok());

        match self.pick {
            DigitPick::First => candidates.next(),
            DigitPick::Largest => candidates.max(),
        }
    }
}

fn compile(strategy: &IdStrategy, out: &mut Vec<Box<dyn IdRule>>) {
    match strategy {
        IdStrategy::QueryParams { params } => out.push(Box::new(QueryParamRule {
            params: params.clone(),
        })),
        IdStrategy::DigitRun { pick, min_digits } => out.push(Box::new(DigitRunRule {
            pick: *pick,
            min_digits: *min_digits,
        })),
        IdStrategy::Fallback { rules } => {
            for rule in rules {
                compile(rule, out);
            }
        }
    }
}

/// Normalized title used as an opaque id for digit-free links.
pub fn title_key(title: &str) -> String {
    normalize_whitespace(title).to_lowercase()
}

/// Adapter driven entirely by a board's configuration.
pub struct ConfiguredAdapter {
    list_url: String,
    detail_url_template: Option<String>,
    content_selectors: Vec<String>,
    rules: Vec<Box<dyn IdRule>>,
}

impl ConfiguredAdapter {
    pub fn new(board: &BoardConfig) -> Self {
        let mut rules = Vec::new();
        compile(&board.id_strategy, &mut rules);

        Self {
            list_url: board.list_url.clone(),
            detail_url_template: board.detail_url_template.clone(),
            content_selectors: board.content_selectors.clone(),
            rules,
        }
    }

    fn is_unlinkable(href: &str) -> bool {
        let lower = href.to_ascii_lowercase();
        href.is_empty() || href == "#" || lower.starts_with("javascript:")
    }
}

impl BoardAdapter for ConfiguredAdapter {
    fn resolve_identifier(&self, row: &RawRow) -> Option<NoticeId> {
        if let Some(id) = self
            .rules
            .iter()
            .find_map(|rule| rule.extract(&self.list_url, &row.href))
        {
            return Some(NoticeId::Numeric(id));
        }

        // Digits that no rule accepted are most likely menu or page
        // numbers; only a digit-free link falls back to the title.
        if has_digits(&row.href) {
            log::debug!("Unresolved row '{}' ({})", row.title, row.href);
            return None;
        }

        let key = title_key(&row.title);
        (!key.is_empty()).then_some(NoticeId::Title(key))
    }

    fn build_detail_url(&self, id: &NoticeId, row: &RawRow) -> String {
        if let (Some(template), NoticeId::Numeric(n)) = (&self.detail_url_template, id) {
            return template.replace("{id}", &n.to_string());
        }
        if Self::is_unlinkable(&row.href) {
            return self.list_url.clone();
        }
        resolve(&self.list_url, &row.href).unwrap_or_else(|| row.href.clone())
    }

    fn content_selectors(&self) -> &[String] {
        &self.content_selectors
    }
}

/// Build the adapter for a board.
pub fn adapter_for(board: &BoardConfig) -> Box<dyn BoardAdapter> {
    Box::new(ConfiguredAdapter::new(board))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::ListingLayout;

    fn board(strategy: IdStrategy, template: Option<&str>) -> BoardConfig {
        BoardConfig {
            key: "test".into(),
            display_name: "Test".into(),
            list_url: "https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/stdList.action?menu_idx=42".into(),
            detail_url_template: template.map(str::to_string),
            id_strategy: strategy,
            listing: ListingLayout::default(),
            content_selectors: vec!["div.board_cont".into()],
            main_channel: "WEBHOOK".into(),
            category_channels: BTreeMap::new(),
        }
    }

    fn row(href: &str, title: &str) -> RawRow {
        RawRow {
            position: 0,
            title: title.into(),
            href: href.into(),
            ordinal: None,
        }
    }

    fn knu_strategy() -> IdStrategy {
        IdStrategy::Fallback {
            rules: vec![
                IdStrategy::QueryParams {
                    params: vec!["btin_idx".into(), "nttId".into()],
                },
                IdStrategy::DigitRun {
                    pick: DigitPick::Largest,
                    min_digits: 5,
                },
            ],
        }
    }

    #[test]
    fn test_query_param_beats_digit_run() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        let id = adapter.resolve_identifier(&row(
            "stdViewBtin.action?menu_idx=42&btin_idx=1336481&page=99999999",
            "t",
        ));
        assert_eq!(id, Some(NoticeId::Numeric(1336481)));
    }

    #[test]
    fn test_second_named_param() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        let id = adapter.resolve_identifier(&row("view.do?menu_idx=42&nttId=98765", "t"));
        assert_eq!(id, Some(NoticeId::Numeric(98765)));
    }

    #[test]
    fn test_largest_digit_run_with_min_length() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        let id = adapter.resolve_identifier(&row("javascript:goView('42', '1336485', '3')", "t"));
        assert_eq!(id, Some(NoticeId::Numeric(1336485)));
    }

    #[test]
    fn test_short_digit_runs_are_unresolved() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        assert_eq!(
            adapter.resolve_identifier(&row("list.action?menu_idx=42&page=2", "t")),
            None
        );
    }

    #[test]
    fn test_first_digit_run() {
        let strategy = IdStrategy::DigitRun {
            pick: DigitPick::First,
            min_digits: 1,
        };
        let adapter = ConfiguredAdapter::new(&board(strategy, None));
        assert_eq!(
            adapter.resolve_identifier(&row("/notice/123/page/4", "t")),
            Some(NoticeId::Numeric(123))
        );
    }

    #[test]
    fn test_title_fallback_for_digit_free_links() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        assert_eq!(
            adapter.resolve_identifier(&row("javascript:;", "  Course   Change ")),
            Some(NoticeId::Title("course change".into()))
        );
        assert_eq!(adapter.resolve_identifier(&row("#", "   ")), None);
        assert_eq!(adapter.resolve_identifier(&row("javascript:void(0)", "t")), None);
    }

    #[test]
    fn test_build_detail_url_from_template() {
        let adapter = ConfiguredAdapter::new(&board(
            knu_strategy(),
            Some("https://www.knu.ac.kr/view.action?btin_idx={id}&menu_idx=42"),
        ));
        let r = row("stdViewBtin.action?btin_idx=1336481", "t");
        assert_eq!(
            adapter.build_detail_url(&NoticeId::Numeric(1336481), &r),
            "https://www.knu.ac.kr/view.action?btin_idx=1336481&menu_idx=42"
        );
    }

    #[test]
    fn test_build_detail_url_without_template() {
        let adapter = ConfiguredAdapter::new(&board(knu_strategy(), None));
        let r = row("stdViewBtin.action?btin_idx=1336481", "t");
        assert_eq!(
            adapter.build_detail_url(&NoticeId::Numeric(1336481), &r),
            "https://www.knu.ac.kr/wbbs/wbbs/bbs/btin/stdViewBtin.action?btin_idx=1336481"
        );

        let js = row("javascript:void(0)", "t");
        assert_eq!(
            adapter.build_detail_url(&NoticeId::Title("t".into()), &js),
            adapter.list_url
        );
    }
}
