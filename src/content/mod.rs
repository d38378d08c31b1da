//! Full-article retrieval and HTML sanitization.
//!
//! - [`article`] - fetches an entry's link and selects its main article block
//! - [`sanitize`] - the [`Sanitizer`] capability and its two implementations

mod article;
mod sanitize;

pub use article::{extract_article, ArticleError, ArticleFetcher};
pub use sanitize::{AllowListSanitizer, PlainTextSanitizer, Sanitizer, SanitizerKind};
