//! Free-text search over title-like fields.
//!
//! Matching is literal, case-insensitive substring containment. Characters
//! such as `%` and `_` have no wildcard meaning: "S_pecial" only matches text
//! that contains "s_pecial".

use data_loader::Movie;

/// A normalized search query.
///
/// A blank (empty or whitespace-only) query matches everything. Non-blank
/// queries are lower-cased but not trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMatcher {
    needle: Option<String>,
}

impl SearchMatcher {
    pub fn new(query: &str) -> Self {
        if query.trim().is_empty() {
            Self { needle: None }
        } else {
            Self {
                needle: Some(query.to_lowercase()),
            }
        }
    }

    /// Matcher for an optional request parameter
    pub fn from_param(query: Option<&str>) -> Self {
        query.map(Self::new).unwrap_or_default()
    }

    pub fn is_blank(&self) -> bool {
        self.needle.is_none()
    }

    /// Does `text` contain the query?
    pub fn matches(&self, text: &str) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }

    /// Does ANY of the fields contain the query?
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        if self.is_blank() {
            return true;
        }
        fields.into_iter().any(|field| self.matches(field))
    }

    /// Title or English title contains the query
    pub fn matches_movie(&self, movie: &Movie) -> bool {
        self.matches_any(movie.titles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, english_title: Option<&str>) -> Movie {
        Movie {
            id: 1,
            title: title.to_string(),
            english_title: english_title.map(str::to_string),
            runtime: 100,
            rating: 7.0,
            where_to_watch: None,
            streaming_services: vec![],
            slug: String::new(),
        }
    }

    #[test]
    fn test_blank_query_matches_everything() {
        for query in ["", "   ", "\t"] {
            let matcher = SearchMatcher::new(query);
            assert!(matcher.is_blank());
            assert!(matcher.matches("anything"));
            assert!(matcher.matches_any(std::iter::empty::<&str>()));
        }
        assert!(SearchMatcher::from_param(None).is_blank());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let matcher = SearchMatcher::new("avatar");
        assert!(matcher.matches("Avatar"));
        assert!(matcher.matches("The Avatar Returns"));
        assert!(!matcher.matches("Avenger"));

        let matcher = SearchMatcher::new("DIRECTOR");
        assert!(matcher.matches("Best Director"));
    }

    #[test]
    fn test_matches_english_title() {
        let batman = movie("Batman", Some("The Dark Knight"));
        assert!(SearchMatcher::new("knight").matches_movie(&batman));
        assert!(SearchMatcher::new("bat").matches_movie(&batman));
        assert!(!SearchMatcher::new("joker").matches_movie(&batman));
    }

    #[test]
    fn test_percent_is_literal() {
        let matcher = SearchMatcher::new("100%");
        assert!(matcher.matches("100% Wolf"));
        assert!(!matcher.matches("1000 Wolves"));
    }

    #[test]
    fn test_underscore_is_literal() {
        let matcher = SearchMatcher::new("S_pecial");
        assert!(matcher.matches("S_pecial Movie"));
        // A LIKE pattern would have let `_` match any character here
        assert!(!matcher.matches("Special Movie"));
    }

    #[test]
    fn test_non_blank_query_is_not_trimmed() {
        let matcher = SearchMatcher::new(" hotel");
        assert!(matcher.matches("Grand Hotel"));
        assert!(!matcher.matches("Hotel Rwanda"));
    }
}
