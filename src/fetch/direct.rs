use super::extract::extract_page;
use super::{ContentFetcher, FetchError, FetchedPage};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;

/// Fetches pages over HTTP with browser-like headers and extracts their text.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_content_chars: usize,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_content_chars: usize,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            max_content_chars,
        })
    }
}

fn accept_language(language: &str) -> String {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case("en") {
        "en;q=0.9".to_string()
    } else {
        format!("{},en;q=0.8", language)
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, language: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, accept_language(language))
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let page = extract_page(&body, self.max_content_chars);
        if page.text.is_empty() {
            return Err(FetchError::NoContent);
        }

        tracing::debug!(url, chars = page.text.chars().count(), "Page extracted");

        Ok(FetchedPage {
            title: page.title,
            text: page.text,
            summary: None,
            author: page.author,
            published_at: page.published_at,
        })
    }

    fn name(&self) -> &str {
        "direct"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language() {
        assert_eq!(accept_language("de"), "de,en;q=0.8");
        assert_eq!(accept_language("en"), "en;q=0.9");
        assert_eq!(accept_language(""), "en;q=0.9");
    }
}
