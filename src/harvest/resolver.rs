//! Content metadata resolution
//!
//! Stage one of a harvest: map a [`ContentId`] to its title, author, and the
//! full list of comment-stream identifiers. A multi-part video yields one
//! stream per part, in part order; collapsing to the first part only would
//! silently drop comments, so all parts are always resolved.

use crate::client::RateLimitedClient;
use crate::config::EndpointConfig;
use crate::harvest::{ContentId, StreamId};
use crate::{HarvestError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Typed view of the metadata endpoint response
#[derive(Debug, Deserialize)]
struct ViewResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<ViewData>,
}

#[derive(Debug, Deserialize)]
struct ViewData {
    title: String,
    owner: Option<Owner>,
    cid: Option<u64>,
    #[serde(default)]
    pages: Vec<PartDescriptor>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    name: String,
}

/// One part descriptor carrying its stream identifier
#[derive(Debug, Deserialize)]
struct PartDescriptor {
    cid: u64,
}

/// Resolved metadata for one content item
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub title: String,
    pub author: String,
    pub streams: Vec<StreamId>,
}

/// Resolves a content identifier to its metadata and stream identifiers
///
/// A missing or malformed response is a resolution failure: the harvester
/// returns an error and produces no partial result.
///
/// # Arguments
///
/// * `client` - Shared rate-limited transport
/// * `endpoints` - Platform endpoint configuration
/// * `id` - The content identifier to resolve
/// * `politeness` - Spacing applied before the metadata request
pub async fn resolve(
    client: &RateLimitedClient,
    endpoints: &EndpointConfig,
    id: &ContentId,
    politeness: Duration,
) -> Result<ResolvedContent> {
    let params = [("bvid", id.as_str().to_string())];

    let response: ViewResponse = client
        .fetch_json(&endpoints.view_url, &params, politeness)
        .await
        .map_err(|e| match e {
            // Malformed body is a resolution failure; transport failures
            // keep their cause for the failure tally
            HarvestError::Json { source, .. } => HarvestError::Resolution {
                id: id.to_string(),
                reason: format!("malformed metadata response: {}", source),
            },
            other => other,
        })?;

    if response.code != 0 {
        return Err(HarvestError::Resolution {
            id: id.to_string(),
            reason: format!("metadata endpoint returned code {}: {}", response.code, response.message),
        });
    }

    let data = response.data.ok_or_else(|| HarvestError::Resolution {
        id: id.to_string(),
        reason: "metadata response carried no data".to_string(),
    })?;

    // Multi-part videos list one descriptor per part, in part order; a
    // single-part video may only carry the top-level stream id
    let streams: Vec<StreamId> = if !data.pages.is_empty() {
        data.pages.iter().map(|p| StreamId::new(p.cid)).collect()
    } else if let Some(cid) = data.cid {
        vec![StreamId::new(cid)]
    } else {
        return Err(HarvestError::Resolution {
            id: id.to_string(),
            reason: "no stream identifiers in metadata".to_string(),
        });
    };

    Ok(ResolvedContent {
        title: data.title,
        author: data.owner.map(|o| o.name).unwrap_or_default(),
        streams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_client() -> RateLimitedClient {
        let config = ClientConfig {
            retry_attempts: 1,
            ..ClientConfig::default()
        };
        RateLimitedClient::new(&config, "http://localhost/").unwrap()
    }

    fn create_endpoints(base: &str) -> EndpointConfig {
        EndpointConfig {
            search_url: format!("{}/search", base),
            view_url: format!("{}/view", base),
            stream_url: format!("{}/stream", base),
            referer: format!("{}/", base),
        }
    }

    #[tokio::test]
    async fn test_resolve_single_part() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view"))
            .and(query_param("bvid", "BV1aa"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code":0,"data":{"title":"t","owner":{"name":"up"},"cid":42,"pages":[]}}"#,
            ))
            .mount(&server)
            .await;

        let client = create_client();
        let endpoints = create_endpoints(&server.uri());
        let resolved = resolve(&client, &endpoints, &ContentId::new("BV1aa"), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(resolved.title, "t");
        assert_eq!(resolved.author, "up");
        assert_eq!(resolved.streams, vec![StreamId::new(42)]);
    }

    #[tokio::test]
    async fn test_resolve_multi_part_in_part_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code":0,"data":{"title":"t","owner":{"name":"up"},"cid":1,"pages":[{"cid":10},{"cid":11},{"cid":12}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = create_client();
        let endpoints = create_endpoints(&server.uri());
        let resolved = resolve(&client, &endpoints, &ContentId::new("BV1bb"), Duration::ZERO)
            .await
            .unwrap();

        let parts: Vec<u64> = resolved.streams.iter().map(|s| s.value()).collect();
        assert_eq!(parts, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_nonzero_code_is_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"code":-404,"message":"not found","data":null}"#),
            )
            .mount(&server)
            .await;

        let client = create_client();
        let endpoints = create_endpoints(&server.uri());
        let result = resolve(&client, &endpoints, &ContentId::new("BV1cc"), Duration::ZERO).await;

        assert!(matches!(result, Err(HarvestError::Resolution { .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = create_client();
        let endpoints = create_endpoints(&server.uri());
        let result = resolve(&client, &endpoints, &ContentId::new("BV1dd"), Duration::ZERO).await;

        assert!(matches!(result, Err(HarvestError::Resolution { .. })));
    }

    #[tokio::test]
    async fn test_missing_streams_is_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/view"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"code":0,"data":{"title":"t","pages":[]}}"#),
            )
            .mount(&server)
            .await;

        let client = create_client();
        let endpoints = create_endpoints(&server.uri());
        let result = resolve(&client, &endpoints, &ContentId::new("BV1ee"), Duration::ZERO).await;

        assert!(matches!(result, Err(HarvestError::Resolution { .. })));
    }
}
