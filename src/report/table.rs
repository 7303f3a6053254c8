//! Tabular export of ranked comments

use crate::filter::RankedComment;
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the ranked comments as a CSV file
///
/// Columns: rank, comment, count. Fields are quoted so commas and quotes in
/// comment text survive round-tripping through spreadsheet tools.
///
/// # Arguments
///
/// * `ranked` - Ranked comments, highest count first
/// * `output_path` - Path where the CSV file should be written
pub fn write_comments_csv(ranked: &[RankedComment], output_path: &Path) -> Result<()> {
    let mut file = File::create(output_path)?;

    writeln!(file, "rank,comment,count")?;
    for (rank, comment) in ranked.iter().enumerate() {
        writeln!(
            file,
            "{},{},{}",
            rank + 1,
            quote_field(&comment.text),
            comment.count
        )?;
    }

    Ok(())
}

/// Quotes a CSV field, doubling embedded quotes
fn quote_field(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(entries: &[(&str, usize)]) -> Vec<RankedComment> {
        entries
            .iter()
            .map(|(text, count)| RankedComment {
                text: text.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.csv");

        write_comments_csv(&ranked(&[("大模型真好", 5), ("LLM nice", 2)]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rank,comment,count");
        assert_eq!(lines[1], "1,\"大模型真好\",5");
        assert_eq!(lines[2], "2,\"LLM nice\",2");
    }

    #[test]
    fn test_quotes_and_commas_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.csv");

        write_comments_csv(&ranked(&[("he said \"hi\", twice", 1)]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"he said \"\"hi\"\", twice\""));
    }

    #[test]
    fn test_empty_ranking_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.csv");

        write_comments_csv(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "rank,comment,count");
    }
}
