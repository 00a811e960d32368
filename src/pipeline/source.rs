use async_trait::async_trait;
use tracing::debug;

use crate::fetcher::{FetchError, fetch};

/// Where the pipeline gets page HTML from.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url` and return its body decoded to UTF-8.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Live pages over HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpPageSource;

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let page = fetch(url).await?;
        debug!(
            url_final = %page.url_final,
            status = %page.status,
            charset = page.charset.name(),
            bytes = page.body_raw.len(),
            fetched_at = %page.fetched_at,
            "page fetched"
        );
        Ok(page.body_utf8)
    }
}
