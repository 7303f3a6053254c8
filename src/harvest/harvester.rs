//! Per-identifier harvesting
//!
//! [`CommentHarvester`] runs the two-stage protocol for one content
//! identifier: resolve metadata to stream identifiers, then fetch and parse
//! every stream in part order.
//!
//! Failure policy:
//! - resolution failure → the identifier fails, no partial result
//! - every stream fails → the identifier fails
//! - some streams fail → partial success: a result is still produced from
//!   the streams that succeeded and the failures are logged, not propagated

use crate::client::RateLimitedClient;
use crate::config::{EndpointConfig, HarvestConfig};
use crate::harvest::resolver::resolve;
use crate::harvest::stream::parse_comments;
use crate::harvest::{ContentId, ContentResult, StreamId};
use crate::{HarvestError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Harvests the comment streams of one content identifier at a time
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct CommentHarvester {
    client: Arc<RateLimitedClient>,
    config: HarvestConfig,
    endpoints: EndpointConfig,
}

impl CommentHarvester {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `client` - Shared rate-limited transport
    /// * `config` - Harvesting delays and limits
    /// * `endpoints` - Platform endpoint configuration
    pub fn new(
        client: Arc<RateLimitedClient>,
        config: HarvestConfig,
        endpoints: EndpointConfig,
    ) -> Self {
        Self {
            client,
            config,
            endpoints,
        }
    }

    /// Harvests all comment streams for one identifier
    ///
    /// # Returns
    ///
    /// * `Ok(ContentResult)` - Full or partial success
    /// * `Err(HarvestError)` - Resolution failed, or every stream failed
    pub async fn harvest(&self, id: ContentId) -> Result<ContentResult> {
        let resolved = resolve(
            &self.client,
            &self.endpoints,
            &id,
            self.config.request_delay(),
        )
        .await?;

        tracing::debug!(
            "Resolved {} ({} streams): {}",
            id,
            resolved.streams.len(),
            resolved.title
        );

        let mut comments: Vec<String> = Vec::new();
        let mut failed_streams: Vec<StreamId> = Vec::new();

        for (index, stream) in resolved.streams.iter().enumerate() {
            // Multi-part politeness: subsequent parts of the same video get
            // a shorter spacing than the per-video delay
            let politeness = if index == 0 {
                self.config.request_delay()
            } else {
                self.config.part_delay()
            };

            match self.fetch_stream(*stream, politeness).await {
                Ok(batch) => {
                    tracing::debug!("Stream {} of {} yielded {} comments", stream, id, batch.len());
                    comments.extend(batch);
                }
                Err(e) => {
                    // Partial failure: logged and tallied on the result, not
                    // propagated for the identifier
                    tracing::warn!("Stream {} of {} failed: {}", stream, id, e);
                    failed_streams.push(*stream);
                }
            }
        }

        if failed_streams.len() == resolved.streams.len() {
            return Err(HarvestError::AllStreamsFailed {
                id: id.to_string(),
                count: failed_streams.len(),
            });
        }

        tracing::info!(
            "Harvested {} ({}): {} comments from {}/{} streams",
            id,
            resolved.title,
            comments.len(),
            resolved.streams.len() - failed_streams.len(),
            resolved.streams.len()
        );

        Ok(ContentResult {
            id,
            title: resolved.title,
            author: resolved.author,
            streams: resolved.streams,
            failed_streams,
            comments,
        })
    }

    /// Fetches and parses one comment stream
    async fn fetch_stream(&self, stream: StreamId, politeness: Duration) -> Result<Vec<String>> {
        let params = [("oid", stream.to_string())];
        let body = self
            .client
            .fetch_text(&self.endpoints.stream_url, &params, politeness)
            .await?;
        Ok(parse_comments(&body))
    }
}
