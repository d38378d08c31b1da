use crate::config::Config;
use crate::feed::parser::{parse_feed, ParsedFeed};
use crate::http::{read_limited_bytes, BodyError};
use crate::util::{validate_url, UrlValidationError};
use thiserror::Error;

/// Errors that can occur while retrieving and parsing the feed document.
///
/// Any of these fails the whole call; no entry is enriched.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Feed URL is malformed, not http(s), or blocked by the host guard
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured feed timeout
    #[error("Request timed out")]
    Timeout,
    /// Body was too large or incomplete
    #[error("Failed to read feed body: {0}")]
    Body(#[from] BodyError),
    /// Document is not valid RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Retrieves `url` and parses it as a feed.
///
/// # Errors
///
/// - [`FeedError::InvalidUrl`] - URL rejected before any request
/// - [`FeedError::Timeout`] - no complete response within `feed_timeout_secs`
/// - [`FeedError::Network`] - connection or TLS errors
/// - [`FeedError::HttpStatus`] - non-2xx response
/// - [`FeedError::Body`] - response exceeded `max_feed_bytes` or was cut short
/// - [`FeedError::Parse`] - not a recognizable feed
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    config: &Config,
) -> Result<ParsedFeed, FeedError> {
    let parsed_url = validate_url(url, config.block_private_hosts)?;

    let bytes = tokio::time::timeout(config.feed_timeout(), async {
        let response = client.get(parsed_url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::HttpStatus(response.status().as_u16()));
        }
        Ok::<_, FeedError>(read_limited_bytes(response, config.max_feed_bytes).await?)
    })
    .await
    .map_err(|_| FeedError::Timeout)??;

    let feed = parse_feed(&bytes, Some(url)).map_err(|e| FeedError::Parse(e.to_string()))?;
    tracing::info!(
        feed = %url,
        title = %feed.title,
        items = feed.entries.len(),
        "Parsed feed"
    );
    Ok(feed)
}
