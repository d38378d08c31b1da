//! Utility functions for common operations.
//!
//! - **URL validation**: scheme checks plus an optional SSRF guard
//! - **Text processing**: whitespace normalization and control-character stripping
//!
//! # Examples
//!
//! ```
//! use rrss::util::{collapse_whitespace, validate_url};
//!
//! let url = validate_url("https://example.com/feed.xml", false).unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! assert_eq!(collapse_whitespace(" a \n b "), "a b");
//! ```

mod text;
mod url_validator;

pub use text::{collapse_blank_lines, collapse_whitespace, strip_control_chars};
pub use url_validator::{validate_url, UrlValidationError};
