//! External web search backends
//!
//! The resolver asks a [`WebSearch`] for candidate pages when the dataset has
//! nothing for a query. Two backends are provided: DuckDuckGo through the
//! `daedra` crate, and a JSON search API reached over HTTP.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run `query` and return at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Web search powered by daedra (DuckDuckGo).
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title.to_string(),
                url: r.url.to_string(),
                snippet: Some(r.description.to_string()),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

#[derive(Debug, Serialize)]
struct RemoteSearchRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct RemoteSearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// JSON search API: `POST {endpoint}` with `{query, max_results}`, answering
/// `{results: [{title, url, snippet}]}`.
pub struct RemoteSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteSearch {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl WebSearch for RemoteSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let mut request = self.client.post(&self.endpoint).json(&RemoteSearchRequest {
            query,
            max_results,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Search(format!(
                "Search API returned {}",
                response.status()
            )));
        }

        let body: RemoteSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid search response: {}", e)))?;

        Ok(body
            .results
            .into_iter()
            .filter(|hit| !hit.url.trim().is_empty())
            .take(max_results)
            .collect())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
