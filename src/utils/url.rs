// src/utils/url.rs

//! Link inspection helpers used by identifier resolution.

use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));

/// Value of the first named query parameter present in `href`.
///
/// Relative links are resolved against `base` first. Names compare
/// case-insensitively; empty values are ignored.
///
/// # Examples
/// ```
/// use notice_relay::utils::url::query_param;
///
/// let names = ["btin_idx".to_string()];
/// assert_eq!(
///     query_param("https://example.com/", "view.action?btin_idx=42&menu_idx=7", &names),
///     Some("42".to_string())
/// );
/// ```
pub fn query_param(base: &str, href: &str, names: &[String]) -> Option<String> {
    let parsed = ::url::Url::parse(base)
        .and_then(|b| b.join(href))
        .or_else(|_| ::url::Url::parse(href))
        .ok()?;

    names.iter().find_map(|name| {
        parsed
            .query_pairs()
            .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

/// All ASCII digit runs in `s`, in order of appearance.
pub fn digit_runs(s: &str) -> Vec<&str> {
    DIGIT_RUN.find_iter(s).map(|m| m.as_str()).collect()
}

/// Whether `s` contains any ASCII digit.
pub fn has_digits(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}
