//! Content fetching from URLs and local files.
//!
//! Every network access in a conversion goes through the [`Fetch`] trait so
//! the pipeline can run against an in-memory fetcher in tests. The default
//! implementation, [`HttpFetcher`], performs blocking HTTP GET requests with a
//! fixed User-Agent and a bounded timeout, and reads `file://` URLs from disk.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{PagebindError, Result};

/// HTTP client configuration for fetching pages and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; pagebind/0.1; epub-generator)".to_string() }
    }
}

/// A source of page and image bytes.
///
/// Implementations must fail on transport errors and on non-2xx responses;
/// callers decide whether a failure is fatal (page) or recoverable (images).
pub trait Fetch {
    /// Fetches the raw body behind `url`.
    fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>>;

    /// Fetches `url` and decodes the body as text.
    ///
    /// The default decodes as UTF-8, replacing invalid sequences.
    fn fetch_text(&self, url: &Url) -> Result<String> {
        let bytes = self.fetch_bytes(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Blocking HTTP fetcher backed by reqwest.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    /// Builds a fetcher with the given timeout and User-Agent.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(PagebindError::HttpError)?;

        Ok(Self { client, config })
    }

    fn get(&self, url: &Url) -> Result<Response> {
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/*;q=0.8,*/*;q=0.5",
            )
            .send()
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PagebindError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        Ok(response)
    }

    /// Timeouts during the request or the body read become [`PagebindError::Timeout`].
    fn request_error(&self, e: reqwest::Error) -> PagebindError {
        if e.is_timeout() { PagebindError::Timeout { timeout: self.config.timeout } } else { PagebindError::HttpError(e) }
    }
}

#[cfg(feature = "fetch")]
impl Fetch for HttpFetcher {
    fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        if url.scheme() == "file" {
            return fetch_file(url);
        }

        let body = self.get(url)?.bytes().map_err(|e| self.request_error(e))?;

        Ok(body.to_vec())
    }

    fn fetch_text(&self, url: &Url) -> Result<String> {
        if url.scheme() == "file" {
            let bytes = fetch_file(url)?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let text = self.get(url)?.text().map_err(|e| self.request_error(e))?;

        Ok(text)
    }
}

/// Reads the file behind a `file://` URL.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(url: &Url) -> Result<Vec<u8>> {
    let path_buf: PathBuf =
        url.to_file_path().map_err(|_| PagebindError::InvalidUrl(format!("not a local file URL: {}", url)))?;

    if !path_buf.exists() {
        Err(PagebindError::FileNotFound(path_buf))
    } else {
        fs::read(&path_buf).map_err(PagebindError::from)
    }
}
