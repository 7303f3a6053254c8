//! Comment classification and filtering
//!
//! The classification collaborator: consumes the harvested comment list and
//! returns a filtered list plus frequency counts. The pipeline core knows
//! nothing about these rules; it only hands over [`CommentRecord`]s.
//!
//! Filtering runs in three passes over the raw text:
//! 1. noise rejection (too short, pure digits, pure punctuation, filler runs)
//! 2. topic relevance (case-insensitive keyword match; ASCII keywords must
//!    not sit inside a longer ASCII word, so "LLM" does not match "LLMs")
//! 3. cleaning (strip URLs, fold punctuation to spaces, collapse whitespace)

use crate::config::FilterConfig;
use crate::harvest::CommentRecord;
use crate::Result;
use regex::Regex;
use std::collections::HashMap;

/// Filler patterns rejected as noise regardless of topic keywords
const NOISE_PATTERNS: &[&str] = &[
    r"^6+$",
    r"^\d+$",
    r"^[^\w\s]+$",
    r"^[赞好强牛6]+$",
    r"^[啊哈嘿嘻]+$",
    r"^[一二三四五六七八九十零]+$",
    r"^[是的对没错]+$",
];

/// A ranked comment with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedComment {
    pub text: String,
    pub count: usize,
}

/// Result of one filtering pass
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Cleaned, on-topic comments in input order
    pub kept: Vec<String>,

    /// Comments rejected as noise
    pub dropped_noise: usize,

    /// Comments rejected as off-topic
    pub dropped_off_topic: usize,
}

impl FilterOutcome {
    pub fn total(&self) -> usize {
        self.kept.len() + self.dropped_noise + self.dropped_off_topic
    }
}

/// Noise/relevance filter over harvested comments
pub struct CommentFilter {
    url_pattern: Regex,
    punct_pattern: Regex,
    whitespace_pattern: Regex,
    noise_patterns: Vec<Regex>,
    keywords: Vec<String>,
    min_length: usize,
    top_n: usize,
}

impl CommentFilter {
    /// Builds a filter from configuration
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let noise_patterns = NOISE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            url_pattern: Regex::new(r"https?://\S+|www\.\S+")?,
            punct_pattern: Regex::new(r"[^\w\s]")?,
            whitespace_pattern: Regex::new(r"\s+")?,
            noise_patterns,
            keywords: config
                .topic_keywords
                .iter()
                .map(|kw| kw.to_lowercase())
                .collect(),
            min_length: config.min_length,
            top_n: config.top_n,
        })
    }

    /// Normalizes a comment: URLs removed, punctuation folded to spaces,
    /// whitespace collapsed
    pub fn clean(&self, text: &str) -> String {
        let text = self.url_pattern.replace_all(text, "");
        let text = self.punct_pattern.replace_all(&text, " ");
        let text = self.whitespace_pattern.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Returns true if the comment is meaningless filler
    pub fn is_noise(&self, text: &str) -> bool {
        let text = text.trim();

        if text.chars().count() < self.min_length {
            return true;
        }

        self.noise_patterns.iter().any(|p| p.is_match(text))
    }

    /// Returns true if the comment mentions any topic keyword
    pub fn is_on_topic(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|kw| contains_word(&lower, kw))
    }

    /// Filters harvested comments: drops noise and off-topic entries, cleans
    /// the rest, preserving input order
    pub fn apply(&self, records: &[CommentRecord]) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for record in records {
            if self.is_noise(&record.text) {
                outcome.dropped_noise += 1;
            } else if !self.is_on_topic(&record.text) {
                outcome.dropped_off_topic += 1;
            } else {
                outcome.kept.push(self.clean(&record.text));
            }
        }

        tracing::info!(
            "Filtered {} comments: kept {}, noise {}, off-topic {}",
            outcome.total(),
            outcome.kept.len(),
            outcome.dropped_noise,
            outcome.dropped_off_topic
        );

        outcome
    }

    /// Ranks the filtered comments by occurrence count, keeping the top N
    ///
    /// Ties break lexicographically so ranking is deterministic.
    pub fn rank(&self, outcome: &FilterOutcome) -> Vec<RankedComment> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for comment in &outcome.kept {
            *counts.entry(comment.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<RankedComment> = counts
            .into_iter()
            .map(|(text, count)| RankedComment {
                text: text.to_string(),
                count,
            })
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
        ranked.truncate(self.top_n);
        ranked
    }

    /// Term frequencies over the ranked comments
    ///
    /// Tokens are whitespace-separated, lowercase-normalized, with
    /// single-character and pure-numeric tokens dropped. CJK text without
    /// spaces contributes whole phrases rather than segmented words; proper
    /// segmentation is out of scope here.
    pub fn term_frequencies(ranked: &[RankedComment]) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for comment in ranked {
            for token in comment.text.split_whitespace() {
                let token = token.to_lowercase();
                if token.chars().count() < 2 || token.chars().all(|c| c.is_ascii_digit()) {
                    continue;
                }
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(String, usize)> = counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(50);
        terms
    }
}

/// Case-folded substring search that refuses matches embedded in a longer
/// ASCII word (so "gpt" matches "用GPT写代码" and "gpt-4" but not "egpt")
fn contains_word(haystack: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }

    let first_is_ascii = keyword
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    let last_is_ascii = keyword
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphabetic());

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(keyword) {
        let begin = start + pos;
        let end = begin + keyword.len();

        let before_ok = !first_is_ascii
            || haystack[..begin]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_alphabetic());
        let after_ok = !last_is_ascii
            || haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_ascii_alphabetic());

        if before_ok && after_ok {
            return true;
        }

        start = end;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::ContentId;

    fn create_filter() -> CommentFilter {
        let config = FilterConfig {
            topic_keywords: vec![
                "大模型".to_string(),
                "LLM".to_string(),
                "GPT".to_string(),
            ],
            top_n: 8,
            min_length: 3,
        };
        CommentFilter::new(&config).unwrap()
    }

    fn records(texts: &[&str]) -> Vec<CommentRecord> {
        texts
            .iter()
            .map(|t| CommentRecord {
                content_id: ContentId::new("BV1"),
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_noise_rejection() {
        let filter = create_filter();

        assert!(filter.is_noise(""));
        assert!(filter.is_noise("66"));
        assert!(filter.is_noise("666666"));
        assert!(filter.is_noise("123456"));
        assert!(filter.is_noise("！！！！"));
        assert!(filter.is_noise("哈哈哈哈"));
        assert!(!filter.is_noise("大模型确实有用"));
        assert!(!filter.is_noise("LLM is great"));
    }

    #[test]
    fn test_topic_relevance() {
        let filter = create_filter();

        assert!(filter.is_on_topic("这个大模型很强"));
        assert!(filter.is_on_topic("llm 真不错"));
        assert!(filter.is_on_topic("用GPT写代码"));
        assert!(filter.is_on_topic("gpt-4 发布了"));
        assert!(!filter.is_on_topic("今天天气不错"));
        // Embedded in a longer ASCII word: not a mention
        assert!(!filter.is_on_topic("wellm， 不相关"));
        assert!(!filter.is_on_topic("egpts"));
    }

    #[test]
    fn test_clean_strips_urls_and_punctuation() {
        let filter = create_filter();

        assert_eq!(
            filter.clean("看这个 https://example.com/x 大模型！！"),
            "看这个 大模型"
        );
        assert_eq!(filter.clean("a,,b   c"), "a b c");
    }

    #[test]
    fn test_apply_counts_and_order() {
        let filter = create_filter();
        let input = records(&[
            "大模型改变世界",
            "666",
            "无关弹幕内容",
            "LLM 牛",
            "大模型改变世界",
        ]);

        let outcome = filter.apply(&input);
        assert_eq!(outcome.kept.len(), 3);
        assert_eq!(outcome.dropped_noise, 1);
        assert_eq!(outcome.dropped_off_topic, 1);
        // Input order preserved
        assert_eq!(outcome.kept[0], "大模型改变世界");
        assert_eq!(outcome.kept[2], "大模型改变世界");
    }

    #[test]
    fn test_rank_top_n_deterministic() {
        let filter = create_filter();
        let mut outcome = FilterOutcome::default();
        for _ in 0..3 {
            outcome.kept.push("大模型改变世界".to_string());
        }
        for _ in 0..2 {
            outcome.kept.push("LLM 有点意思".to_string());
        }
        outcome.kept.push("GPT 也还行".to_string());

        let ranked = filter.rank(&outcome);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].text, "大模型改变世界");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[1].count, 2);
        assert_eq!(ranked[2].count, 1);
    }

    #[test]
    fn test_rank_truncates_at_top_n() {
        let config = FilterConfig {
            topic_keywords: vec!["LLM".to_string()],
            top_n: 2,
            min_length: 1,
        };
        let filter = CommentFilter::new(&config).unwrap();

        let mut outcome = FilterOutcome::default();
        for i in 0..5 {
            outcome.kept.push(format!("LLM comment {}", i));
        }

        assert_eq!(filter.rank(&outcome).len(), 2);
    }

    #[test]
    fn test_term_frequencies() {
        let ranked = vec![
            RankedComment {
                text: "LLM 写代码 很强".to_string(),
                count: 3,
            },
            RankedComment {
                text: "llm 有点意思 123".to_string(),
                count: 1,
            },
        ];

        let terms = CommentFilter::term_frequencies(&ranked);
        // Case folded, numeric token dropped
        let llm = terms.iter().find(|(t, _)| t == "llm").unwrap();
        assert_eq!(llm.1, 2);
        assert!(!terms.iter().any(|(t, _)| t == "123"));
    }

    #[test]
    fn test_contains_word_boundaries() {
        assert!(contains_word("the llm wins", "llm"));
        assert!(contains_word("llm", "llm"));
        assert!(contains_word("gpt-4", "gpt"));
        assert!(!contains_word("llms", "llm"));
        assert!(!contains_word("allm", "llm"));
        assert!(contains_word("国产大模型崛起", "大模型"));
    }
}
