//! The enrichment pipeline.
//!
//! [`Enricher`] fans out one unit of work per feed entry (identifier,
//! article fetch, sanitizing) and fans the results back in through a single
//! stream collector. [`Harvester`] puts the feed fetch in front of it.

use crate::config::Config;
use crate::content::{ArticleFetcher, Sanitizer};
use crate::feed::{fetch_feed, FeedEntry, FeedError};
use crate::http::build_client;
use crate::identity::{IdentifierError, IdentifierPolicy, Identify};
use crate::record::FeedRecord;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    /// The feed itself could not be retrieved or parsed.
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// Not a single entry could be given an identifier.
    #[error("Identifier generation failed for all {count} entries: {source}")]
    Identifier {
        count: usize,
        #[source]
        source: IdentifierError,
    },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Turns parsed feed entries into [`FeedRecord`]s.
///
/// Holds no per-call state; one instance can serve any number of feeds.
#[derive(Clone)]
pub struct Enricher {
    fetcher: ArticleFetcher,
    sanitizer: Arc<dyn Sanitizer>,
    identifier: Arc<dyn Identify>,
    max_concurrency: usize,
}

impl Enricher {
    /// Builds an enricher whose article fetches go through `client`.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        let sanitizer = config.sanitizer.build();
        Self {
            fetcher: ArticleFetcher::new(client, Arc::clone(&sanitizer), config),
            sanitizer,
            identifier: Arc::new(IdentifierPolicy),
            max_concurrency: config.max_concurrency,
        }
    }

    /// Replaces the sanitizer used for entry bodies and article blocks.
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.fetcher = self.fetcher.with_sanitizer(Arc::clone(&sanitizer));
        self.sanitizer = sanitizer;
        self
    }

    /// Replaces the identifier policy.
    pub fn with_identifier(mut self, identifier: Arc<dyn Identify>) -> Self {
        self.identifier = identifier;
        self
    }

    /// Enriches every entry concurrently and returns once all are done.
    ///
    /// # Behavior
    ///
    /// - Runs at most `max_concurrency` entries at a time (0 = all at once)
    /// - Entries without a link never touch the network
    /// - A failed article fetch or extraction leaves that record's `extended_body` empty
    /// - An entry whose identifier cannot be generated is dropped
    /// - Records come back in completion order, not input order
    ///
    /// # Errors
    ///
    /// [`EnrichError::Identifier`] when identifier generation failed for
    /// every entry of a non-empty batch.
    pub async fn enrich(
        &self,
        feed_url: &str,
        feed_title: &str,
        entries: Vec<FeedEntry>,
    ) -> Result<Vec<FeedRecord>, EnrichError> {
        let total = entries.len();
        if total == 0 {
            tracing::info!(feed = %feed_url, "Feed has no entries");
            return Ok(Vec::new());
        }

        let limit = match self.max_concurrency {
            0 => total,
            n => n.min(total),
        };
        tracing::info!(feed = %feed_url, items = total, concurrency = limit, "Enriching feed entries");

        let outcomes: Vec<Result<FeedRecord, IdentifierError>> = stream::iter(entries)
            .map(|entry| self.enrich_entry(feed_url, feed_title, entry))
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut records = Vec::with_capacity(total);
        let mut first_failure = None;
        let mut failed = 0usize;
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) => {
                    failed += 1;
                    first_failure.get_or_insert(e);
                }
            }
        }

        if records.is_empty() {
            if let Some(source) = first_failure {
                return Err(EnrichError::Identifier {
                    count: total,
                    source,
                });
            }
        }

        let extended = records
            .iter()
            .filter(|r| !r.extended_body.is_empty())
            .count();
        tracing::info!(
            feed = %feed_url,
            records = records.len(),
            failed_ids = failed,
            extended = extended,
            "Parsed feed items"
        );
        Ok(records)
    }

    async fn enrich_entry(
        &self,
        feed_url: &str,
        feed_title: &str,
        entry: FeedEntry,
    ) -> Result<FeedRecord, IdentifierError> {
        let id = match self.identifier.identify(&entry.guid, &entry.description) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    title = %entry.title,
                    url = %entry.link,
                    error = %e,
                    "Failed to generate id for entry, skipping"
                );
                return Err(e);
            }
        };

        let extended_body = if entry.link.is_empty() {
            tracing::debug!(
                id = %id,
                title = %entry.title,
                "Entry has no link, skipping extended article"
            );
            String::new()
        } else {
            match self.fetcher.fetch_extended(&entry.link).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(id = %id, url = %entry.link, error = %e, "Failed to fetch extended article");
                    String::new()
                }
            }
        };

        let item_body = self.sanitizer.sanitize(&entry.description);

        let record = FeedRecord {
            id,
            feed_url: feed_url.to_string(),
            feed_title: feed_title.to_string(),
            item_title: entry.title,
            item_body,
            item_url: entry.link,
            published: entry.published,
            extended_body,
            created_at: Utc::now(),
        };
        tracing::debug!(
            id = %record.id,
            extended_chars = record.extended_body.chars().count(),
            "Enriched entry"
        );
        Ok(record)
    }
}

/// Fetches a feed by URL and enriches all of its entries.
#[derive(Clone)]
pub struct Harvester {
    client: reqwest::Client,
    config: Config,
    enricher: Enricher,
}

impl Harvester {
    /// Builds a harvester with its own HTTP client configured from `config`.
    pub fn new(config: Config) -> Result<Self, EnrichError> {
        let client = build_client(&config).map_err(EnrichError::Client)?;
        Ok(Self::with_client(client, config))
    }

    /// Builds a harvester around an existing client.
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        let enricher = Enricher::new(client.clone(), &config);
        Self {
            client,
            config,
            enricher,
        }
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Fetches `url`, parses it and enriches every entry.
    ///
    /// A feed-level failure is returned unchanged and no entry is attempted.
    pub async fn harvest(&self, url: &str) -> Result<Vec<FeedRecord>, EnrichError> {
        tracing::info!(feed = %url, "Received feed url");
        let feed = fetch_feed(&self.client, url, &self.config).await?;
        self.enricher.enrich(url, &feed.title, feed.entries).await
    }
}
