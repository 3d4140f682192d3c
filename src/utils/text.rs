// src/utils/text.rs

//! Text helpers shared by extraction, summarization and formatting.

use unicode_segmentation::UnicodeSegmentation;

/// Collapse every whitespace run to a single space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count of non-whitespace characters.
pub fn visible_len(s: &str) -> usize {
    s.chars().filter(|c| !c.is_whitespace()).count()
}

/// Length in user-perceived characters.
pub fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

/// First `max` graphemes of `s`, never splitting a character.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate to `max` graphemes, appending an ellipsis when cut.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if grapheme_len(s) <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(1);
    format!("{}…", truncate(s, keep).trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
    }

    #[test]
    fn test_visible_len() {
        assert_eq!(visible_len(" 학 사\n공지 "), 4);
    }

    #[test]
    fn test_truncate_keeps_hangul_intact() {
        assert_eq!(truncate("수강신청 안내", 4), "수강신청");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 10), "abcdef");
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(grapheme_len(&truncate_with_ellipsis("가나다라마바", 4)), 4);
    }
}
