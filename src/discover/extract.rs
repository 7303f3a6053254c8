//! Identifier pattern extraction
//!
//! Search responses embed one identifier-bearing field per result entry, of
//! the form `"bvid":"BV…"`. Extraction is a narrowly-scoped pattern match on
//! the raw body rather than a full JSON walk: page payloads have shifted
//! shape across platform revisions, but the tagged field itself has stayed
//! stable. Any structural deviation simply yields zero matches and is treated
//! as page exhaustion by the caller, never as a hard error.

use crate::Result;
use regex::Regex;

/// Pattern matcher for identifier-bearing fields in search responses
#[derive(Debug)]
pub struct IdentifierPattern {
    regex: Regex,
}

impl IdentifierPattern {
    /// Compiles the identifier pattern
    pub fn new() -> Result<Self> {
        // One tagged field adjacent to each result entry
        let regex = Regex::new(r#""bvid"\s*:\s*"([^"]+)""#)?;
        Ok(Self { regex })
    }

    /// Extracts all identifiers from a search response body, in order of
    /// appearance (duplicates included; dedup is the discoverer's job)
    pub fn extract<'t>(&self, body: &'t str) -> Vec<&'t str> {
        self.regex
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_identifiers_in_order() {
        let pattern = IdentifierPattern::new().unwrap();
        let body = r#"{"result":[{"bvid":"BV1xx411c7mD","title":"a"},{"bvid":"BV1yy411c7mE","title":"b"}]}"#;

        let ids = pattern.extract(body);
        assert_eq!(ids, vec!["BV1xx411c7mD", "BV1yy411c7mE"]);
    }

    #[test]
    fn test_tolerates_whitespace_around_colon() {
        let pattern = IdentifierPattern::new().unwrap();
        let body = r#""bvid" : "BV1zz411c7mF""#;
        assert_eq!(pattern.extract(body), vec!["BV1zz411c7mF"]);
    }

    #[test]
    fn test_keeps_duplicates() {
        let pattern = IdentifierPattern::new().unwrap();
        let body = r#""bvid":"BV1aa","bvid":"BV1aa""#;
        assert_eq!(pattern.extract(body).len(), 2);
    }

    #[test]
    fn test_no_matches_on_unrelated_body() {
        let pattern = IdentifierPattern::new().unwrap();
        assert!(pattern.extract("<html>rate limited</html>").is_empty());
        assert!(pattern.extract("").is_empty());
    }
}
