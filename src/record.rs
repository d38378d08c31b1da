use chrono::{DateTime, Utc};
use serde::Serialize;

/// One enriched feed entry.
///
/// Created once inside the entry's enrichment task and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedRecord {
    /// GUID, content hash, or random fallback (see [`crate::identity`]).
    pub id: String,
    /// URL the feed was fetched from; identical across a batch.
    pub feed_url: String,
    /// Feed title; identical across a batch.
    pub feed_title: String,
    pub item_title: String,
    /// Entry description after sanitizing.
    pub item_body: String,
    pub item_url: String,
    pub published: Option<DateTime<Utc>>,
    /// Sanitized full article text, empty when unavailable.
    pub extended_body: String,
    /// When this record's enrichment finished.
    pub created_at: DateTime<Utc>,
}
