//! Title category classifier.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Category, CategoryKeyword};

static LEADING_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[\s*([^\]]+?)\s*\]|【\s*([^】]+?)\s*】)").expect("static regex")
});

/// Classifies titles by a leading bracket token or a leading keyword.
#[derive(Debug, Clone, Default)]
pub struct CategoryClassifier {
    vocabulary: Vec<CategoryKeyword>,
}

impl CategoryClassifier {
    pub fn new(vocabulary: Vec<CategoryKeyword>) -> Self {
        Self { vocabulary }
    }

    /// Category of a title, if it declares one.
    ///
    /// `[취업] 2025 채용설명회` → label `취업`. Without brackets the title
    /// must start with a vocabulary keyword followed by whitespace or the
    /// end of the string, so `장학금 신청` does not match `장학`.
    pub fn classify(&self, title: &str) -> Option<Category> {
        if let Some(caps) = LEADING_BRACKET.captures(title) {
            let label = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or("", |m| m.as_str().trim());
            if !label.is_empty() {
                return Some(self.category_for(label));
            }
        }

        let title = title.trim_start();
        self.vocabulary.iter().find_map(|entry| {
            let rest = title.strip_prefix(entry.keyword.as_str())?;
            (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| Category {
                label: entry.keyword.clone(),
                tag: entry.tag.clone(),
            })
        })
    }

    fn category_for(&self, label: &str) -> Category {
        let tag = self
            .vocabulary
            .iter()
            .find(|entry| entry.keyword == label)
            .map_or_else(|| label.to_string(), |entry| entry.tag.clone());

        Category {
            label: label.to_string(),
            tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new(vec![
            CategoryKeyword::new("취업", "career"),
            CategoryKeyword::new("장학", "scholarship"),
        ])
    }

    #[test]
    fn test_bracket_token_maps_to_tag() {
        let category = classifier().classify("[취업] 2025 채용설명회").unwrap();
        assert_eq!(category.label, "취업");
        assert_eq!(category.tag, "career");
    }

    #[test]
    fn test_unmapped_bracket_token_is_its_own_tag() {
        let category = classifier().classify("【 학사 】 휴강 안내").unwrap();
        assert_eq!(category.label, "학사");
        assert_eq!(category.tag, "학사");
    }

    #[test]
    fn test_leading_keyword_needs_boundary() {
        let category = classifier().classify("장학 신청 안내").unwrap();
        assert_eq!(category.tag, "scholarship");
        assert!(classifier().classify("장학금 신청 안내").is_none());
        assert_eq!(classifier().classify("취업").unwrap().tag, "career");
    }

    #[test]
    fn test_no_category() {
        assert!(classifier().classify("2025학년도 수강신청 안내 [필독]").is_none());
        assert!(classifier().classify("").is_none());
    }

    #[test]
    fn test_blank_bracket_is_no_category() {
        assert!(classifier().classify("[ ] 안내").is_none());
        assert!(classifier().classify("【\u{3000}】 취업 박람회").is_none());
        assert_eq!(classifier().classify("[ 취업 ] 박람회").unwrap().label, "취업");
    }
}
