//! Feed retrieval and parsing.
//!
//! - [`parser`] - RSS/Atom/JSON Feed parsing via the `feed-rs` crate
//! - [`fetcher`] - HTTP retrieval of the feed document with size and time limits
//!
//! # Example
//!
//! ```ignore
//! use rrss::feed::fetch_feed;
//!
//! let feed = fetch_feed(&client, "https://example.com/feed.xml", &config).await?;
//! println!("{} has {} entries", feed.title, feed.entries.len());
//! ```

mod fetcher;
mod parser;

pub use fetcher::{fetch_feed, FeedError};
pub use parser::{parse_feed, FeedEntry, ParsedFeed};
