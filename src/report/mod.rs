//! Report generation
//!
//! Consumes the harvest outcome and filter results and produces files: a
//! markdown run summary, a CSV of the ranked comments, and a raw JSON
//! snapshot from which the first two can be rebuilt.

mod markdown;
mod raw;
mod table;

pub use markdown::{format_summary, write_summary};
pub use raw::{read_snapshot, write_snapshot, HarvestSnapshot};
pub use table::write_comments_csv;

use crate::filter::RankedComment;
use crate::harvest::HarvestFailure;
use chrono::{DateTime, Utc};

/// Per-video row in the run summary
#[derive(Debug, Clone)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub parts: usize,
    pub failed_parts: usize,
    pub comment_count: usize,
}

/// Everything the report stage needs about one completed run
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: String,
    pub keywords: Vec<String>,

    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_comments: usize,

    pub kept_comments: usize,
    pub dropped_noise: usize,
    pub dropped_off_topic: usize,

    pub top_comments: Vec<RankedComment>,
    pub term_frequencies: Vec<(String, usize)>,
    pub videos: Vec<VideoSummary>,
    pub failures: Vec<HarvestFailure>,
}

impl RunSummary {
    /// Run duration in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of attempted identifiers that produced a result
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64 * 100.0
    }
}
