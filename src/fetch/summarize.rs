//! Summaries of fetched text.
//!
//! A configured [`Summarizer`] is tried first. Whatever goes wrong with it
//! (error, timeout, empty answer) the caller still gets a summary: the first
//! words of the text followed by `...`.

use super::FetchError;
use super::extract::truncate_chars;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Characters of input sent to a summarization service.
const MAX_SUMMARY_INPUT_CHARS: usize = 10_000;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        language: &str,
        max_words: usize,
    ) -> Result<String, FetchError>;
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
    language: &'a str,
    max_length: usize,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: String,
}

/// Summarization API: `POST {endpoint}` with `{text, language, max_length}`.
pub struct RemoteSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemoteSummarizer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(
        &self,
        text: &str,
        language: &str,
        max_words: usize,
    ) -> Result<String, FetchError> {
        let input = truncate_chars(text, MAX_SUMMARY_INPUT_CHARS);
        let mut request = self.client.post(&self.endpoint).json(&SummarizeRequest {
            text: &input,
            language,
            max_length: max_words,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        Ok(body.summary)
    }
}

/// First `max_words` words of `text` followed by `...`.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().take(max_words).collect();
    format!("{}...", words.join(" "))
}

/// Summarize with `summarizer` if there is one, otherwise or on any failure
/// fall back to [`truncate_words`]. Never fails.
pub async fn summarize_or_truncate(
    summarizer: Option<&dyn Summarizer>,
    text: &str,
    language: &str,
    max_words: usize,
    timeout: Duration,
) -> String {
    let Some(summarizer) = summarizer else {
        return truncate_words(text, max_words);
    };

    match tokio::time::timeout(timeout, summarizer.summarize(text, language, max_words)).await {
        Ok(Ok(summary)) if !summary.trim().is_empty() => {
            if summary.split_whitespace().count() > max_words {
                debug!(max_words, "Summary longer than requested, truncating it");
                truncate_words(&summary, max_words)
            } else {
                summary.trim().to_string()
            }
        }
        Ok(Ok(_)) => {
            warn!("Summarizer returned an empty summary, truncating instead");
            truncate_words(text, max_words)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Summarization failed, truncating instead");
            truncate_words(text, max_words)
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Summarization timed out, truncating instead");
            truncate_words(text, max_words)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSummarizer(Result<String, FetchError>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, _: &str, _: &str, _: usize) -> Result<String, FetchError> {
            self.0.clone()
        }
    }

    struct StalledSummarizer;

    #[async_trait]
    impl Summarizer for StalledSummarizer {
        async fn summarize(&self, _: &str, _: &str, _: usize) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    const TEXT: &str = "eins zwei drei vier fünf";

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words(TEXT, 3), "eins zwei drei...");
        assert_eq!(truncate_words("  a\n b  ", 10), "a b...");
    }

    #[tokio::test]
    async fn test_without_summarizer_truncates() {
        let summary = summarize_or_truncate(None, TEXT, "de", 2, Duration::from_secs(1)).await;
        assert_eq!(summary, "eins zwei...");
    }

    #[tokio::test]
    async fn test_uses_summarizer_answer() {
        let summarizer = FixedSummarizer(Ok(" Kurzfassung ".to_string()));
        let summary =
            summarize_or_truncate(Some(&summarizer), TEXT, "de", 2, Duration::from_secs(1)).await;
        assert_eq!(summary, "Kurzfassung");
    }

    #[tokio::test]
    async fn test_overlong_summary_is_capped() {
        let summarizer = FixedSummarizer(Ok("Die Lage im Osten bleibt angespannt".to_string()));
        let summary =
            summarize_or_truncate(Some(&summarizer), TEXT, "de", 3, Duration::from_secs(1)).await;
        assert_eq!(summary, "Die Lage im...");
    }

    #[tokio::test]
    async fn test_summarizer_error_degrades() {
        let summarizer = FixedSummarizer(Err(FetchError::Status(500)));
        let summary =
            summarize_or_truncate(Some(&summarizer), TEXT, "de", 2, Duration::from_secs(1)).await;
        assert_eq!(summary, "eins zwei...");
    }

    #[tokio::test]
    async fn test_empty_summary_degrades() {
        let summarizer = FixedSummarizer(Ok("   ".to_string()));
        let summary =
            summarize_or_truncate(Some(&summarizer), TEXT, "de", 1, Duration::from_secs(1)).await;
        assert_eq!(summary, "eins...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarizer_timeout_degrades() {
        let summary = summarize_or_truncate(
            Some(&StalledSummarizer),
            TEXT,
            "de",
            2,
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(summary, "eins zwei...");
    }
}
