//! Comment-stream parsing
//!
//! A comment stream is a tagged-markup document where each comment is wrapped
//! in a `<d>` element whose text content is the comment. The parser is
//! deliberately tolerant: structurally invalid entries are dropped at comment
//! granularity and never fail the stream.

use scraper::{Html, Selector};

/// Parses a comment-stream body into comment texts, in emission order
///
/// Entries with empty or whitespace-only text are skipped. A body with no
/// recognizable comment elements yields an empty list, not an error.
///
/// # Arguments
///
/// * `body` - The raw stream document
pub fn parse_comments(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);

    let selector = match Selector::parse("d") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
