//! Markdown summary generation

use crate::report::RunSummary;
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the run summary as a markdown file
///
/// # Arguments
///
/// * `summary` - The completed run summary
/// * `output_path` - Path where the markdown file should be written
pub fn write_summary(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let markdown = format_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_summary(summary: &RunSummary) -> String {
    let mut md = String::new();

    md.push_str("# Danmu Harvest Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!("- **Keywords**: {}\n", summary.keywords.join(", ")));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Harvest Statistics\n\n");
    md.push_str(&format!("- **Videos Attempted**: {}\n", summary.attempted));
    md.push_str(&format!("- **Videos Succeeded**: {}\n", summary.succeeded));
    md.push_str(&format!("- **Videos Failed**: {}\n", summary.failed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Total Comments**: {}\n\n",
        summary.total_comments
    ));

    md.push_str("## Filter Statistics\n\n");
    md.push_str(&format!("- **Kept**: {}\n", summary.kept_comments));
    md.push_str(&format!("- **Dropped (noise)**: {}\n", summary.dropped_noise));
    md.push_str(&format!(
        "- **Dropped (off-topic)**: {}\n\n",
        summary.dropped_off_topic
    ));

    if !summary.top_comments.is_empty() {
        md.push_str("## Top Comments\n\n");
        md.push_str("| Rank | Comment | Count |\n");
        md.push_str("|------|---------|-------|\n");
        for (rank, comment) in summary.top_comments.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                rank + 1,
                escape_cell(&comment.text),
                comment.count
            ));
        }
        md.push('\n');
    }

    if !summary.term_frequencies.is_empty() {
        md.push_str("## Term Frequencies\n\n");
        md.push_str("| Term | Count |\n");
        md.push_str("|------|-------|\n");
        for (term, count) in &summary.term_frequencies {
            md.push_str(&format!("| {} | {} |\n", escape_cell(term), count));
        }
        md.push('\n');
    }

    if !summary.videos.is_empty() {
        md.push_str("## Videos\n\n");
        md.push_str("| Identifier | Title | Author | Parts | Failed Parts | Comments |\n");
        md.push_str("|------------|-------|--------|-------|--------------|----------|\n");
        for video in &summary.videos {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                video.id,
                escape_cell(&video.title),
                escape_cell(&video.author),
                video.parts,
                video.failed_parts,
                video.comment_count
            ));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failed Identifiers\n\n");
        md.push_str("| Identifier | Kind | Reason |\n");
        md.push_str("|------------|------|--------|\n");
        for failure in &summary.failures {
            let kind = if failure.transient {
                "transient"
            } else {
                "permanent"
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.id,
                kind,
                escape_cell(&failure.reason)
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes pipe characters so free text cannot break table layout
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RankedComment;
    use crate::harvest::{ContentId, HarvestFailure};
    use crate::report::VideoSummary;
    use chrono::TimeZone;

    fn create_test_summary() -> RunSummary {
        RunSummary {
            started_at: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            finished_at: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 5, 0).unwrap(),
            config_hash: "abc123".to_string(),
            keywords: vec!["LLM".to_string()],
            attempted: 10,
            succeeded: 8,
            failed: 2,
            total_comments: 800,
            kept_comments: 120,
            dropped_noise: 500,
            dropped_off_topic: 180,
            top_comments: vec![RankedComment {
                text: "大模型改变世界".to_string(),
                count: 12,
            }],
            term_frequencies: vec![("llm".to_string(), 30)],
            videos: vec![VideoSummary {
                id: "BV1aa".to_string(),
                title: "A | B".to_string(),
                author: "up".to_string(),
                parts: 2,
                failed_parts: 1,
                comment_count: 100,
            }],
            failures: vec![
                HarvestFailure {
                    id: ContentId::new("BV1zz"),
                    transient: false,
                    reason: "resolution failed".to_string(),
                },
                HarvestFailure {
                    id: ContentId::new("BV1yy"),
                    transient: true,
                    reason: "retries exhausted".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_summary_sections_present() {
        let md = format_summary(&create_test_summary());

        assert!(md.contains("# Danmu Harvest Summary"));
        assert!(md.contains("- **Videos Attempted**: 10"));
        assert!(md.contains("- **Success Rate**: 80.00%"));
        assert!(md.contains("- **Duration**: 300 seconds"));
        assert!(md.contains("大模型改变世界"));
        assert!(md.contains("| BV1zz | permanent | resolution failed |"));
        assert!(md.contains("| BV1yy | transient | retries exhausted |"));
    }

    #[test]
    fn test_pipe_in_title_escaped() {
        let md = format_summary(&create_test_summary());
        assert!(md.contains("A \\| B"));
    }

    #[test]
    fn test_write_summary_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        write_summary(&create_test_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Harvest Statistics"));
    }
}
