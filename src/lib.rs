//! Fetch a syndication feed and enrich every entry with the full text of the
//! article it links to.
//!
//! ```ignore
//! use rrss::{Config, Harvester};
//!
//! let harvester = Harvester::new(Config::default())?;
//! for record in harvester.harvest("https://example.com/feed.xml").await? {
//!     println!("{} {} chars", record.id, record.extended_body.len());
//! }
//! ```

pub mod config;
pub mod content;
pub mod feed;
pub mod http;
pub mod identity;
pub mod pipeline;
pub mod record;
pub mod util;

pub use config::{Config, ConfigError};
pub use pipeline::{EnrichError, Enricher, Harvester};
pub use record::FeedRecord;
