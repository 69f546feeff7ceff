use crate::models::{Category, Memo};
use strum::IntoEnumIterator;

/// Normalize a raw tag string: split on whitespace, drop empty tokens,
/// de-duplicate preserving first occurrence, rejoin with single spaces.
///
/// Idempotent: normalize(normalize(t)) == normalize(t).
pub(crate) fn normalize_tags(raw: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for token in raw.split_whitespace() {
        if !seen.contains(&token) {
            seen.push(token);
        }
    }
    seen.join(" ")
}

pub(crate) fn split_tags(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

/// A memo matches a non-empty tag query iff at least one whitespace-split
/// query token is a case-insensitive substring of the memo's tag string.
/// A memo with no tags never matches a non-empty query.
pub(crate) fn tags_match(memo_tags: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    if memo_tags.trim().is_empty() {
        return false;
    }

    let haystack = memo_tags.to_lowercase();
    query
        .to_lowercase()
        .split_whitespace()
        .any(|token| haystack.contains(token))
}

/// Client-side predicate set for the owner-scoped list (small result set,
/// filtered in memory over an eager fetch).
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoFilter {
    pub favorite_only: bool,
    pub category: Option<Category>,
    /// Case-insensitive substring over title/subtitle.
    pub text_query: String,
    /// Any-of over whitespace-split tokens against the tag string.
    pub tag_query: String,
}

impl MemoFilter {
    pub fn matches(&self, memo: &Memo) -> bool {
        if self.favorite_only && !memo.favorite {
            return false;
        }

        if let Some(category) = self.category {
            if memo.category != category {
                return false;
            }
        }

        let text = self.text_query.trim();
        if !text.is_empty() {
            let needle = text.to_lowercase();
            let title_hit = memo.title.to_lowercase().contains(&needle);
            let subtitle_hit = memo
                .subtitle
                .as_deref()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !title_hit && !subtitle_hit {
                return false;
            }
        }

        tags_match(memo.tags_str(), &self.tag_query)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CategoryCounts {
    pub all: usize,
    pub per_category: Vec<(Category, usize)>,
}

pub(crate) fn category_counts(memos: &[Memo]) -> CategoryCounts {
    let per_category = Category::iter()
        .map(|c| (c, memos.iter().filter(|m| m.category == c).count()))
        .collect();
    CategoryCounts {
        all: memos.len(),
        per_category,
    }
}

impl CategoryCounts {
    pub fn count_for(&self, category: Category) -> usize {
        self.per_category
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memo(title: &str, subtitle: Option<&str>, tags: &str, category: Category, fav: bool) -> Memo {
        Memo {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            title: title.to_string(),
            subtitle: subtitle.map(|s| s.to_string()),
            url: None,
            content: None,
            publish: false,
            tags: if tags.is_empty() {
                None
            } else {
                Some(tags.to_string())
            },
            category,
            favorite: fav,
            created_at: None,
            updated_at: None,
            profiles: None,
        }
    }

    #[test]
    fn test_normalize_tags_drops_empty_tokens() {
        assert_eq!(normalize_tags("  dp   algorithm  "), "dp algorithm");
        assert_eq!(normalize_tags(""), "");
        assert_eq!(normalize_tags("   "), "");
    }

    #[test]
    fn test_normalize_tags_deduplicates_preserving_order() {
        assert_eq!(normalize_tags("dp graph dp tree graph"), "dp graph tree");
    }

    #[test]
    fn test_normalize_tags_is_idempotent() {
        for raw in ["", "  a  b a ", "x", "\tdp\n dp"] {
            let once = normalize_tags(raw);
            assert_eq!(normalize_tags(&once), once, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_tags_match_any_of_semantics() {
        assert!(tags_match("dp algorithm", "graph dp"));
        assert!(!tags_match("dp algorithm", "graph tree"));
    }

    #[test]
    fn test_tags_match_case_insensitive_substring() {
        assert!(tags_match("SegTree", "seg"));
        assert!(tags_match("dp", "DP"));
    }

    #[test]
    fn test_empty_tags_never_match_nonempty_query() {
        assert!(!tags_match("", "dp"));
        assert!(!tags_match("   ", "dp"));
        // Empty query matches everything.
        assert!(tags_match("", ""));
    }

    #[test]
    fn test_filter_conjunction() {
        let m = memo(
            "DP intro",
            Some("knapsack"),
            "dp algorithm",
            Category::Algorithm,
            true,
        );

        let mut f = MemoFilter::default();
        assert!(f.matches(&m));

        f.favorite_only = true;
        f.category = Some(Category::Algorithm);
        f.text_query = "knap".to_string();
        f.tag_query = "dp".to_string();
        assert!(f.matches(&m));

        f.category = Some(Category::Math);
        assert!(!f.matches(&m));
    }

    #[test]
    fn test_filter_text_over_title_and_subtitle() {
        let m = memo("Dijkstra", Some("shortest path"), "", Category::Algorithm, false);

        let f = MemoFilter {
            text_query: "DIJK".to_string(),
            ..Default::default()
        };
        assert!(f.matches(&m));

        let f = MemoFilter {
            text_query: "shortest".to_string(),
            ..Default::default()
        };
        assert!(f.matches(&m));

        let f = MemoFilter {
            text_query: "flow".to_string(),
            ..Default::default()
        };
        assert!(!f.matches(&m));
    }

    #[test]
    fn test_category_counts_sum_to_all() {
        let memos = vec![
            memo("a", None, "", Category::Algorithm, false),
            memo("b", None, "", Category::Algorithm, false),
            memo("c", None, "", Category::Math, false),
            memo("d", None, "", Category::Others, false),
        ];
        let counts = category_counts(&memos);
        assert_eq!(counts.all, 4);
        assert_eq!(counts.count_for(Category::Algorithm), 2);
        assert_eq!(counts.count_for(Category::DataStructure), 0);
        assert_eq!(counts.count_for(Category::Math), 1);
        assert_eq!(counts.count_for(Category::Others), 1);
        let sum: usize = counts.per_category.iter().map(|(_, n)| n).sum();
        assert_eq!(sum, counts.all);
    }
}
