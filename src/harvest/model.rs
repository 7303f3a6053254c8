//! Data model for the harvesting pipeline
//!
//! Identifiers are opaque newtypes; results are immutable once appended to
//! the outcome collection.

use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token uniquely naming one piece of content on the platform
///
/// Immutable once discovered. Dedup during discovery is membership in a set
/// keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Token naming one comment stream
///
/// A single-part video has exactly one stream; a multi-part video has one
/// stream per part, in part order. Derived during resolution, never persisted
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(u64);

impl StreamId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One harvested comment: raw text plus the content it was fetched under
///
/// No ordering guarantee across records from different streams; within one
/// stream, original emission order is preserved.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub content_id: ContentId,
    pub text: String,
}

/// Aggregate result for one content item
///
/// Created once all of the item's streams have been fetched (success or
/// partial failure) and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResult {
    /// The identifier this result was harvested under
    pub id: ContentId,

    /// Video title from the metadata endpoint
    pub title: String,

    /// Uploader name from the metadata endpoint
    pub author: String,

    /// All resolved comment streams, in part order
    pub streams: Vec<StreamId>,

    /// Streams that could not be fetched (partial failure), in part order
    pub failed_streams: Vec<StreamId>,

    /// Harvested comment texts: stream order first, within-stream order second
    pub comments: Vec<String>,
}

impl ContentResult {
    /// Number of comments harvested for this item
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// True if some but not all of the item's streams were fetched
    pub fn is_partial(&self) -> bool {
        !self.failed_streams.is_empty()
    }
}

/// A failed identifier and the reason it produced no result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestFailure {
    pub id: ContentId,

    /// True if the failure was an exhausted-retry transport failure; a
    /// transient entry may succeed on a later run, a permanent one will not
    pub transient: bool,

    pub reason: String,
}

impl HarvestFailure {
    /// Records an error against the identifier it failed
    pub fn from_error(id: ContentId, error: &HarvestError) -> Self {
        Self {
            id,
            transient: error.is_transient(),
            reason: error.to_string(),
        }
    }
}

/// Final collection produced by the coordinator
///
/// Results appear in completion order, not discovery order, since harvests
/// finish concurrently. A failed identifier contributes no [`ContentResult`]
/// but is recorded in the failure tally.
#[derive(Debug, Default)]
pub struct HarvestOutcome {
    pub results: Vec<ContentResult>,
    pub failures: Vec<HarvestFailure>,
}

impl HarvestOutcome {
    /// Total identifiers attempted
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Identifiers that produced a result
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Identifiers that produced no result
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total comments across all results
    pub fn total_comments(&self) -> usize {
        self.results.iter().map(|r| r.comments.len()).sum()
    }

    /// Flattens all results into per-comment records for the filter stage
    ///
    /// Record order follows result completion order, then stream order, then
    /// within-stream order.
    pub fn comment_records(&self) -> Vec<CommentRecord> {
        self.results
            .iter()
            .flat_map(|r| {
                r.comments.iter().map(|text| CommentRecord {
                    content_id: r.id.clone(),
                    text: text.clone(),
                })
            })
            .collect()
    }
}
