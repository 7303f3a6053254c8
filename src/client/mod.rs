//! Rate-limited HTTP client
//!
//! All network traffic in the pipeline goes through [`RateLimitedClient`]:
//! - a single shared connection pool with per-call timeouts
//! - a declarative retry policy for transient failures (timeouts, connection
//!   resets, HTTP 5xx, HTTP 429) with attempt-scaled backoff
//! - a politeness delay applied *before* each request, so callers pay the
//!   delay cost deterministically regardless of response latency
//!
//! Permanent failures (4xx other than 429, malformed requests) are never
//! retried and escalate immediately to the caller.

use crate::config::ClientConfig;
use crate::{HarvestError, Result};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Declarative retry policy for transient transport failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget per call (1 = no retries)
    pub max_attempts: u32,

    /// Base backoff delay, scaled by attempt number
    pub backoff_base: Duration,

    /// Whether to add uniform random jitter to each backoff wait
    pub jitter: bool,
}

impl RetryPolicy {
    /// Builds a retry policy from the transport configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            jitter: config.jitter,
        }
    }

    /// Returns true if the HTTP status should be retried
    ///
    /// Retryable: 429 (rate limited) and all 5xx. Every other non-success
    /// status is a permanent request error.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Computes the backoff delay before the given retry
    ///
    /// The delay grows linearly with the number of failed attempts, with an
    /// optional uniform jitter of up to half the base delay.
    ///
    /// # Arguments
    ///
    /// * `failed_attempts` - Number of attempts that have already failed (>= 1)
    pub fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let base = self.backoff_base * failed_attempts;

        if self.jitter {
            let half_base_ms = self.backoff_base.as_millis() as u64 / 2;
            if half_base_ms > 0 {
                let extra = rand::thread_rng().gen_range(0..=half_base_ms);
                return base + Duration::from_millis(extra);
            }
        }

        base
    }
}

/// Shared HTTP transport with retry, backoff, and politeness delays
///
/// The client mutates no shared state beyond connection-pool internals and is
/// safe for concurrent use by multiple harvesting workers.
#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    client: Client,
    policy: RetryPolicy,
}

impl RateLimitedClient {
    /// Creates a new client from the transport configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Transport configuration (user agent, timeout, retries)
    /// * `referer` - Referer header sent with every request
    ///
    /// # Returns
    ///
    /// * `Ok(RateLimitedClient)` - Successfully built client
    /// * `Err(HarvestError)` - Failed to build the underlying HTTP client
    pub fn new(config: &ClientConfig, referer: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(referer) {
            headers.insert(reqwest::header::REFERER, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| HarvestError::Http {
                url: String::new(),
                source,
            })?;

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Returns the retry policy in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, returning the status code and response body
    ///
    /// The politeness delay is awaited before the first attempt. Transient
    /// failures are retried with backoff up to the policy's attempt budget;
    /// a retried call that eventually succeeds is indistinguishable from one
    /// that succeeded on the first attempt.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `params` - Query parameters appended to the URL
    /// * `politeness` - Minimum spacing applied before issuing the request
    ///
    /// # Returns
    ///
    /// * `Ok((status, body))` - Successful response
    /// * `Err(HarvestError)` - Permanent failure or exhausted retry budget
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        politeness: Duration,
    ) -> Result<(u16, String)> {
        if !politeness.is_zero() {
            tokio::time::sleep(politeness).await;
        }

        let mut last_error = String::new();

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let wait = self.policy.backoff_delay(attempt - 1);
                tracing::debug!(
                    "Retrying {} (attempt {}/{}) after {:?}: {}",
                    url,
                    attempt,
                    self.policy.max_attempts,
                    wait,
                    last_error
                );
                tokio::time::sleep(wait).await;
            }

            let request = self.client.get(url).query(params);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok((status.as_u16(), body)),
                            Err(e) => {
                                // Truncated/aborted body counts as transient
                                last_error = format!("body read failed: {}", e);
                                continue;
                            }
                        }
                    }

                    if RetryPolicy::is_retryable_status(status) {
                        tracing::warn!("Transient HTTP {} for {}", status.as_u16(), url);
                        last_error = format!("HTTP {}", status.as_u16());
                        continue;
                    }

                    // Permanent request error: surface immediately
                    return Err(HarvestError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Err(e) => {
                    if e.is_builder() {
                        // Malformed request: retrying cannot help
                        return Err(HarvestError::Http {
                            url: url.to_string(),
                            source: e,
                        });
                    }

                    // Timeouts, connection resets, and other transport-level
                    // failures share the retry budget
                    tracing::warn!("Transport error for {}: {}", url, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(HarvestError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
            last_error,
        })
    }

    /// Fetches a URL and returns the response body as text
    pub async fn fetch_text(
        &self,
        url: &str,
        params: &[(&str, String)],
        politeness: Duration,
    ) -> Result<String> {
        let (_, body) = self.fetch(url, params, politeness).await?;
        Ok(body)
    }

    /// Fetches a URL and deserializes the JSON response body
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        politeness: Duration,
    ) -> Result<T> {
        let (_, body) = self.fetch(url, params, politeness).await?;
        serde_json::from_str(&body).map_err(|source| HarvestError::Json {
            url: url.to_string(),
            source,
        })
    }
}
