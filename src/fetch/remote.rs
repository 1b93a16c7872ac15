use super::extract::{collapse_whitespace, truncate_chars};
use super::{ContentFetcher, FetchError, FetchedPage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    include_html: bool,
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    text: String,
    title: Option<String>,
    author: Option<String>,
    published_at: Option<String>,
}

/// Crawler API client: `POST {endpoint}` with `{url, include_html: false}`.
pub struct RemoteFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    max_content_chars: usize,
}

impl RemoteFetcher {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        max_content_chars: usize,
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
            max_content_chars,
        })
    }
}

#[async_trait]
impl ContentFetcher for RemoteFetcher {
    async fn fetch(&self, url: &str, _language: &str) -> Result<FetchedPage, FetchError> {
        let mut request = self.client.post(&self.endpoint).json(&CrawlRequest {
            url,
            include_html: false,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: CrawlResponse = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let text = truncate_chars(&collapse_whitespace(&body.text), self.max_content_chars);
        if text.is_empty() {
            return Err(FetchError::NoContent);
        }

        Ok(FetchedPage {
            title: body.title,
            text,
            summary: None,
            author: body.author,
            published_at: body.published_at,
        })
    }

    fn name(&self) -> &str {
        "remote"
    }
}
