//! Error types for pagebind operations.
//!
//! This module defines the main error type [`PagebindError`] which represents
//! every failure that aborts a conversion: bad input, page fetching, content
//! location, and packaging.
//!
//! Per-image and cover failures are *not* errors at this level. They are
//! reported through [`crate::Observer::warning`] and the conversion continues.
//!
//! # Example
//!
//! ```rust
//! use pagebind_core::{PagebindError, Result};
//!
//! fn require_url(url: &str) -> Result<&str> {
//!     if url.trim().is_empty() {
//!         return Err(PagebindError::MissingUrl);
//!     }
//!     Ok(url)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations.
#[derive(Error, Debug)]
pub enum PagebindError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// No page URL was supplied.
    #[error("A page URL is required")]
    MissingUrl,

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, is malformed, or uses a scheme
    /// that cannot be fetched.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The streaming HTML rewriter rejected the input.
    #[error("Failed to rewrite HTML: {0}")]
    RewriteError(String),

    /// No content could be located in the document.
    ///
    /// Returned when the located node is empty, which is what an empty page
    /// produces once every locator step has fallen through.
    #[error("No content could be found on this page")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for file operations.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Settings file is unreadable or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The EPUB packager failed to assemble or serialize the book.
    #[error("Failed to package EPUB: {0}")]
    PackageError(String),
}

impl From<lol_html::errors::RewritingError> for PagebindError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        PagebindError::RewriteError(err.to_string())
    }
}

/// Result type alias for PagebindError.
pub type Result<T> = std::result::Result<T, PagebindError>;
