use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Danmu-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub client: ClientConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// Identifier discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search topic keywords, tried in order until the target count is met
    pub keywords: Vec<String>,

    /// Number of content identifiers to discover before stopping
    #[serde(rename = "target-count")]
    pub target_count: usize,

    /// Hard ceiling on result pages fetched per keyword
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Results requested per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Minimum randomized delay between result pages (milliseconds)
    #[serde(rename = "page-delay-min-ms", default = "default_page_delay_min")]
    pub page_delay_min_ms: u64,

    /// Maximum randomized delay between result pages (milliseconds)
    #[serde(rename = "page-delay-max-ms", default = "default_page_delay_max")]
    pub page_delay_max_ms: u64,
}

/// Harvesting pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of identifiers harvested concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Politeness delay before each metadata/stream request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Delay between successive stream fetches of one multi-part video
    /// (milliseconds)
    #[serde(rename = "part-delay-ms", default = "default_part_delay")]
    pub part_delay_ms: u64,
}

/// Platform endpoint configuration
///
/// Overridable so integration tests can point the pipeline at a mock server.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Paged video search endpoint (JSON)
    #[serde(rename = "search-url", default = "default_search_url")]
    pub search_url: String,

    /// Video metadata endpoint (JSON)
    #[serde(rename = "view-url", default = "default_view_url")]
    pub view_url: String,

    /// Comment-stream endpoint (tagged markup), keyed by the `oid` parameter
    #[serde(rename = "stream-url", default = "default_stream_url")]
    pub stream_url: String,

    /// Referer header sent with every request
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            view_url: default_view_url(),
            stream_url: default_stream_url(),
            referer: default_referer(),
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-call timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry budget for transient failures (total attempts, not re-tries)
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff delay, scaled by attempt number (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base")]
    pub backoff_base_ms: u64,

    /// Whether backoff delays carry random jitter
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            backoff_base_ms: default_backoff_base(),
            jitter: default_jitter(),
        }
    }
}

/// Comment filtering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Keywords a comment must mention to count as on-topic
    #[serde(rename = "topic-keywords")]
    pub topic_keywords: Vec<String>,

    /// Number of ranked comments kept in the report
    #[serde(rename = "top-n", default = "default_top_n")]
    pub top_n: usize,

    /// Comments shorter than this (in characters) are dropped as noise
    #[serde(rename = "min-length", default = "default_min_length")]
    pub min_length: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the ranked-comments CSV file
    #[serde(rename = "comments-csv-path")]
    pub comments_csv_path: String,

    /// Path to the raw harvest snapshot, consumed by `--report-only`
    #[serde(rename = "raw-path", default = "default_raw_path")]
    pub raw_path: String,
}

impl SearchConfig {
    /// Returns the randomized inter-page delay bounds
    pub fn page_delay_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.page_delay_min_ms),
            Duration::from_millis(self.page_delay_max_ms),
        )
    }
}

impl HarvestConfig {
    /// Politeness delay before each request belonging to one identifier
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Delay between successive stream fetches of one identifier
    pub fn part_delay(&self) -> Duration {
        Duration::from_millis(self.part_delay_ms)
    }
}

fn default_max_pages() -> u32 {
    50
}

fn default_page_size() -> u32 {
    20
}

fn default_page_delay_min() -> u64 {
    500
}

fn default_page_delay_max() -> u64 {
    1500
}

fn default_concurrency() -> usize {
    5
}

fn default_request_delay() -> u64 {
    1000
}

fn default_part_delay() -> u64 {
    500
}

fn default_raw_path() -> String {
    "./raw-harvest.json".to_string()
}

fn default_search_url() -> String {
    "https://api.bilibili.com/x/web-interface/search/type".to_string()
}

fn default_view_url() -> String {
    "https://api.bilibili.com/x/web-interface/view".to_string()
}

fn default_stream_url() -> String {
    "https://api.bilibili.com/x/v1/dm/list.so".to_string()
}

fn default_referer() -> String {
    "https://www.bilibili.com/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    2000
}

fn default_jitter() -> bool {
    true
}

fn default_top_n() -> usize {
    8
}

fn default_min_length() -> usize {
    3
}
