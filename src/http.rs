//! Shared HTTP plumbing: client construction and size-limited body reads.

use crate::config::Config;
use crate::util::validate_url;
use futures::StreamExt;
use reqwest::redirect::Policy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    TooLarge(usize),
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    Incomplete { expected: u64, received: usize },
}

/// Redirect hops followed before giving up (reqwest's default limit).
const MAX_REDIRECTS: usize = 10;

/// Builds the client shared by the feed fetch and every article fetch.
///
/// Only the idle-connection timeout is tuned; requests otherwise go out
/// with the client's default headers. With `block_private_hosts` set, every
/// redirect target is validated like the original link.
pub fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().pool_idle_timeout(config.pool_idle_timeout());
    if config.block_private_hosts {
        builder = builder.redirect(guarded_redirects());
    }
    builder.build()
}

/// Redirect policy used while the private-host guard is on.
///
/// - Limits redirects to [`MAX_REDIRECTS`] hops
/// - Detects redirect loops
/// - Refuses any hop whose target fails [`validate_url`]
fn guarded_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("Too many redirects");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        if let Err(e) = validate_url(url.as_str(), true) {
            tracing::warn!(to = %url, error = %e, "Refusing redirect");
            return attempt.error(e);
        }

        tracing::debug!(to = %url, hop = attempt.previous().len() + 1, "Following redirect");
        attempt.follow()
    })
}

/// Reads a response body, refusing anything larger than `limit` bytes.
pub(crate) async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(BodyError::TooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(BodyError::Incomplete {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
