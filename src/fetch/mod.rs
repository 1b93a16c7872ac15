//! Content fetching
//!
//! A [`ContentFetcher`] turns one URL into normalized text. Failures are
//! categorized so the orchestrator can tell an empty page (NO_CONTENT) from a
//! broken one (FAILED).
//!
//! - [`direct::HttpFetcher`] downloads the page and extracts text locally
//! - [`remote::RemoteFetcher`] delegates to a crawler API
//! - [`summarize`] shortens fetched text, degrading to word truncation

/// Direct HTTP fetching with local extraction.
pub mod direct;
/// HTML text extraction.
pub mod extract;
/// Crawler API client.
pub mod remote;
/// Summarization with a truncation fallback.
pub mod summarize;

use async_trait::async_trait;
use std::time::Duration;

pub use direct::HttpFetcher;
pub use remote::RemoteFetcher;
pub use summarize::{RemoteSummarizer, Summarizer, summarize_or_truncate, truncate_words};

/// Normalized page content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub title: Option<String>,
    pub text: String,
    /// Set when the backend already produced a summary
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("page has no textual content")]
    NoContent,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Map a reqwest failure, keeping timeouts distinguishable.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout)
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return its text. `language` is a hint for backends
    /// that negotiate content language.
    async fn fetch(&self, url: &str, language: &str) -> Result<FetchedPage, FetchError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
