//! # Client Configuration
//!
//! ```text
//! ClientConfig::new("http://localhost:8000/api")
//!     base_url      http://localhost:8000/api/   (trailing '/' added)
//!     timeout       10s per request
//!     retry_window  5s of backoff for reads, zero disables
//! ```
//!
//! The trailing slash matters: `Url::join("products")` on `.../api` would
//! replace the `api` segment instead of appending to it.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Base URL of a backend started locally with its defaults.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Always ends with `/`.
    base_url: Url,

    /// Default: 10 seconds
    pub timeout: Duration,

    /// Total time spent retrying a read after network errors.
    /// Default: 5 seconds
    pub retry_window: Duration,

    /// First delay between read retries. Default: 200 ms
    pub initial_backoff: Duration,
}

impl ClientConfig {
    /// Parses and normalizes `base_url`. Only http and https are accepted.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut url = Url::parse(base_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                base_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(ClientConfig {
            base_url: url,
            timeout: Duration::from_secs(10),
            retry_window: Duration::from_secs(5),
            initial_backoff: Duration::from_millis(200),
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_window(mut self, window: Duration) -> Self {
        self.retry_window = window;
        self
    }

    pub fn initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a relative path such as `products/7` against the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
