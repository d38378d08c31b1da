//! Entry identifiers.
//!
//! Identity is source-provided when the feed carries a GUID, and
//! content-addressed otherwise, so refetching an unchanged feed yields the
//! same identifiers.

use rand::rngs::OsRng;
use rand::RngCore;
use sha1::{Digest, Sha1};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentifierError {
    /// The operating system entropy source could not be read.
    #[error("Failed to generate random identifier: {0}")]
    Entropy(String),
}

/// Derives an identifier for one feed entry.
pub trait Identify: Send + Sync {
    fn identify(&self, guid: &str, description: &str) -> Result<String, IdentifierError>;
}

/// Default identifier policy.
///
/// Precedence:
/// 1. a non-empty `guid` is used verbatim (no collision check)
/// 2. otherwise the lowercase hex SHA-1 of `description`
/// 3. otherwise a random UUID, which is the only fallible step
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierPolicy;

impl Identify for IdentifierPolicy {
    fn identify(&self, guid: &str, description: &str) -> Result<String, IdentifierError> {
        if !guid.is_empty() {
            tracing::debug!("Using provided GUID as id");
            return Ok(guid.to_string());
        }

        let id = content_hash(description);
        if !id.is_empty() {
            tracing::debug!("Using hashed content as id");
            return Ok(id);
        }

        tracing::debug!("Falling back to random id");
        random_id()
    }
}

/// Lowercase hex SHA-1 digest of `content` (40 characters).
///
/// # Examples
///
/// ```
/// use rrss::identity::content_hash;
///
/// assert_eq!(content_hash(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
/// ```
pub fn content_hash(content: &str) -> String {
    let hash = Sha1::digest(content.as_bytes());
    format!("{:x}", hash)
}

/// Random (version 4) UUID drawn from the OS entropy source.
pub fn random_id() -> Result<String, IdentifierError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| IdentifierError::Entropy(e.to_string()))?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
}
