use crate::config::Config;
use crate::content::Sanitizer;
use crate::http::{read_limited_bytes, BodyError};
use crate::util::{validate_url, UrlValidationError};
use scraper::{Html, Selector};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Elements treated as a self-contained article body.
const ARTICLE_SELECTORS: &str = r#"article, [role="article"], [itemprop="articleBody"]"#;

static ARTICLE_SELECTOR: OnceLock<Selector> = OnceLock::new();

fn article_selector() -> &'static Selector {
    ARTICLE_SELECTOR
        .get_or_init(|| Selector::parse(ARTICLE_SELECTORS).expect("article selector is valid"))
}

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Invalid article link: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Expected 2XX status code but received '{0}'")]
    HttpStatus(u16),
    #[error("Failed to read article body: {0}")]
    Body(#[from] BodyError),
    #[error("Article extraction failed: {0}")]
    Extraction(#[from] tokio::task::JoinError),
}

/// Downloads the page an entry links to and extracts its article text.
///
/// Cloning is cheap; the client and sanitizer are shared.
#[derive(Clone)]
pub struct ArticleFetcher {
    client: reqwest::Client,
    sanitizer: Arc<dyn Sanitizer>,
    timeout: Option<Duration>,
    max_bytes: usize,
    block_private_hosts: bool,
}

impl ArticleFetcher {
    pub fn new(client: reqwest::Client, sanitizer: Arc<dyn Sanitizer>, config: &Config) -> Self {
        Self {
            client,
            sanitizer,
            timeout: config.fetch_timeout(),
            max_bytes: config.max_article_bytes,
            block_private_hosts: config.block_private_hosts,
        }
    }

    /// Replaces the sanitizer applied to candidate article blocks.
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Fetches `link` and returns the sanitized text of its largest article block.
    ///
    /// A page without any article block yields `Ok("")`. Callers skip this
    /// entirely for entries without a link.
    ///
    /// # Errors
    ///
    /// - [`ArticleError::InvalidUrl`] - link is not an http(s) URL or is blocked
    /// - [`ArticleError::Timeout`] - the configured fetch deadline elapsed
    /// - [`ArticleError::Network`] - DNS, connection or TLS failure
    /// - [`ArticleError::HttpStatus`] - any status outside 200-299
    /// - [`ArticleError::Body`] - body exceeded the size limit or was cut short
    /// - [`ArticleError::Extraction`] - the extraction task panicked
    pub async fn fetch_extended(&self, link: &str) -> Result<String, ArticleError> {
        let url = validate_url(link, self.block_private_hosts)?;

        let html = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.download(url))
                .await
                .map_err(|_| ArticleError::Timeout(limit))??,
            None => self.download(url).await?,
        };

        let body_bytes = html.len();
        let sanitizer = Arc::clone(&self.sanitizer);
        let text =
            tokio::task::spawn_blocking(move || extract_article(&html, sanitizer.as_ref())).await?;
        tracing::debug!(
            url = %link,
            body_bytes = body_bytes,
            extended_chars = text.chars().count(),
            "Fetched extended article"
        );
        Ok(text)
    }

    async fn download(&self, url: Url) -> Result<String, ArticleError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, self.max_bytes).await?;
        Ok(decode_body(bytes))
    }
}

/// Picks the article block whose sanitized form is longest.
///
/// Length is counted in characters. On a tie the block that appears first
/// in the document wins. Returns an empty string when the page has no
/// article block at all.
pub fn extract_article(html: &str, sanitizer: &dyn Sanitizer) -> String {
    let document = Html::parse_document(html);

    let mut best = String::new();
    let mut best_len = 0;
    for block in document.select(article_selector()) {
        let text = sanitizer.sanitize(&block.html());
        let len = text.chars().count();
        if len > best_len {
            best = text;
            best_len = len;
        }
    }
    best
}

fn decode_body(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
