//! Identifier discovery
//!
//! [`IdentifierDiscoverer`] paginates the platform's search endpoint for each
//! configured keyword, extracts content identifiers from every result page,
//! and accumulates them into a deduplicated, first-seen-ordered set.
//!
//! Discovery runs sequentially: pagination is inherently ordered and
//! rate-sensitive, so it is never parallelized. Termination conditions,
//! checked in order on each page:
//!
//! 1. the set reaches the target count → return immediately;
//! 2. the page yields zero identifiers not already in the set → the keyword
//!    is exhausted (or the platform is stonewalling), move on;
//! 3. the hard page ceiling is reached.
//!
//! Transport failure on a page, after the client's own retries, ends that
//! keyword's pagination but is never fatal to the run.

mod extract;

pub use extract::IdentifierPattern;

use crate::client::RateLimitedClient;
use crate::config::{EndpointConfig, SearchConfig};
use crate::harvest::ContentId;
use crate::Result;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

/// Discovers a bounded, deduplicated set of content identifiers for a topic
pub struct IdentifierDiscoverer<'a> {
    client: &'a RateLimitedClient,
    config: &'a SearchConfig,
    endpoints: &'a EndpointConfig,
    pattern: IdentifierPattern,
}

impl<'a> IdentifierDiscoverer<'a> {
    /// Creates a new discoverer
    ///
    /// # Arguments
    ///
    /// * `client` - Shared rate-limited transport
    /// * `config` - Search configuration (keywords, target count, ceilings)
    /// * `endpoints` - Platform endpoint configuration
    pub fn new(
        client: &'a RateLimitedClient,
        config: &'a SearchConfig,
        endpoints: &'a EndpointConfig,
    ) -> Result<Self> {
        Ok(Self {
            client,
            config,
            endpoints,
            pattern: IdentifierPattern::new()?,
        })
    }

    /// Runs discovery across all configured keywords
    ///
    /// # Returns
    ///
    /// Identifiers in first-seen order, deduplicated across keywords, never
    /// exceeding the configured target count. An empty result is not an
    /// error; the caller decides whether the harvest is worth running.
    pub async fn discover(&self) -> Vec<ContentId> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut discovered: Vec<ContentId> = Vec::new();

        for keyword in &self.config.keywords {
            tracing::info!("Searching for keyword: {}", keyword);

            self.discover_keyword(keyword, &mut seen, &mut discovered)
                .await;

            if discovered.len() >= self.config.target_count {
                break;
            }
        }

        tracing::info!(
            "Discovery complete: {} identifiers (target {})",
            discovered.len(),
            self.config.target_count
        );

        discovered
    }

    /// Paginates one keyword until a termination condition fires
    async fn discover_keyword(
        &self,
        keyword: &str,
        seen: &mut HashSet<String>,
        discovered: &mut Vec<ContentId>,
    ) {
        for page in 1..=self.config.max_pages {
            let body = match self.fetch_page(keyword, page).await {
                Ok(body) => body,
                Err(e) => {
                    // Retries are already spent inside the client; treat the
                    // page as end-of-results for this keyword and keep what
                    // was accumulated
                    tracing::warn!(
                        "Search page {} for '{}' failed, stopping keyword: {}",
                        page,
                        keyword,
                        e
                    );
                    return;
                }
            };

            let new_on_page = self.collect_page(&body, seen, discovered);

            if discovered.len() >= self.config.target_count {
                tracing::debug!("Target count reached on page {}", page);
                return;
            }

            if new_on_page == 0 {
                tracing::debug!(
                    "Page {} for '{}' yielded no new identifiers, keyword exhausted",
                    page,
                    keyword
                );
                return;
            }

            if page < self.config.max_pages {
                tokio::time::sleep(self.page_delay()).await;
            }
        }

        tracing::debug!(
            "Page ceiling ({}) reached for '{}'",
            self.config.max_pages,
            keyword
        );
    }

    /// Fetches one search result page
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        let params = [
            ("search_type", "video".to_string()),
            ("keyword", keyword.to_string()),
            ("page", page.to_string()),
            ("page_size", self.config.page_size.to_string()),
        ];

        self.client
            .fetch_text(&self.endpoints.search_url, &params, Duration::ZERO)
            .await
    }

    /// Adds a page's identifiers to the running set, stopping at the target
    ///
    /// Returns the number of identifiers not seen before. Entries beyond the
    /// target count are truncated, preserving first-seen order.
    fn collect_page(
        &self,
        body: &str,
        seen: &mut HashSet<String>,
        discovered: &mut Vec<ContentId>,
    ) -> usize {
        let mut new_on_page = 0;

        for id in self.pattern.extract(body) {
            if discovered.len() >= self.config.target_count {
                break;
            }
            if seen.insert(id.to_string()) {
                discovered.push(ContentId::new(id));
                new_on_page += 1;
            }
        }

        new_on_page
    }

    /// Randomized delay between result pages
    fn page_delay(&self) -> Duration {
        let (min, max) = self.config.page_delay_range();
        if max <= min {
            return min;
        }
        let span = (max - min).as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=span);
        min + Duration::from_millis(extra)
    }
}
