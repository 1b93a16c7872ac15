//! Mock implementations for testing.
//!
//! Mock fetchers, datasets and search backends shared by the integration
//! tests, plus helpers that wire an orchestrator around them.

use async_trait::async_trait;
use sift::fetch::{ContentFetcher, FetchError, FetchedPage};
use sift::research::{RequestRegistry, ResearchOrchestrator, SourceResolver};
use sift::sources::{DatasetEntry, DatasetSource, DatasetStore, SearchHit, WebSearch};
use sift::types::{AppError, Result};
use sift::utils::toml_config::{GenericSource, SiftConfig};
use sift::{AppState, SiftConfigManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How the mock fetcher answers a URL.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// Succeed with this text
    Text(String),
    /// Fail with this error
    Fail(FetchError),
    /// Sleep, then succeed with this text
    Delay(Duration, String),
    /// Panic inside the fetch
    Panic,
}

/// Fetcher answering by URL substring, counting calls and concurrency.
///
/// URLs matching no rule succeed with `"Inhalt von {url}"` after `latency`.
pub struct MockFetcher {
    rules: Vec<(String, Behavior)>,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Answer URLs containing `pattern` with `behavior`.
    pub fn on(mut self, pattern: &str, behavior: Behavior) -> Self {
        self.rules.push((pattern.to_string(), behavior));
        self
    }

    /// Delay of the default answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let behavior = self
            .rules
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, behavior)| behavior.clone())
            .unwrap_or_else(|| Behavior::Delay(self.latency, format!("Inhalt von {}", url)));

        match behavior {
            Behavior::Text(text) => Ok(page(&text)),
            Behavior::Fail(err) => Err(err),
            Behavior::Delay(delay, text) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(page(&text))
            }
            Behavior::Panic => panic!("mock fetcher panicked on {}", url),
        }
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn page(text: &str) -> FetchedPage {
    FetchedPage {
        title: Some("Fetched title".to_string()),
        text: text.to_string(),
        ..Default::default()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(
        &self,
        url: &str,
        _language: &str,
    ) -> std::result::Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        self.answer(url).await
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Dataset whose every lookup fails.
pub struct BrokenDataset;

#[async_trait]
impl DatasetStore for BrokenDataset {
    async fn load(&self, _query: &str) -> Result<Option<DatasetEntry>> {
        Err(AppError::Dataset("dataset file is corrupt".to_string()))
    }

    async fn save(&self, _query: &str, _entry: &DatasetEntry) -> Result<()> {
        Err(AppError::Dataset("read-only".to_string()))
    }
}

/// Search returning the same hits for every query.
pub struct FixedSearch(pub Vec<SearchHit>);

#[async_trait]
impl WebSearch for FixedSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.0.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Dataset entry with `n` inline sources.
pub fn dataset_entry(query: &str, n: usize) -> DatasetEntry {
    DatasetEntry {
        query: query.to_string(),
        sources: (0..n)
            .map(|i| DatasetSource {
                title: format!("Artikel {}", i + 1),
                url: format!("https://www.tagesschau.de/artikel-{}", i + 1),
                snippet: Some(format!("Kurzfassung {}", i + 1)),
                content: Some(format!("Volltext des Artikels {}", i + 1)),
                author: Some("tagesschau".to_string()),
                published_at: Some("2026-01-03T06:00:00Z".to_string()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// `n` generic sources at `https://site-{i}.example/`.
pub fn generic_sources(n: usize) -> Vec<GenericSource> {
    (0..n)
        .map(|i| GenericSource {
            title: format!("Site {}", i),
            url: format!("https://site-{}.example/", i),
        })
        .collect()
}

/// Config manager over the defaults, adjusted by `adjust`.
pub fn config_manager(adjust: impl FnOnce(&mut SiftConfig)) -> Arc<SiftConfigManager> {
    let mut config = SiftConfig::default();
    adjust(&mut config);
    Arc::new(SiftConfigManager::from_config(config))
}

/// Orchestrator with its own registry over the given collaborators.
pub fn orchestrator(
    dataset: Arc<dyn DatasetStore>,
    fetcher: Arc<dyn ContentFetcher>,
    config_manager: Arc<SiftConfigManager>,
) -> ResearchOrchestrator {
    let resolver = SourceResolver::new(dataset, config_manager.config().resolver.clone());
    ResearchOrchestrator::new(
        Arc::new(RequestRegistry::new()),
        Arc::new(resolver),
        fetcher,
        config_manager,
    )
}

/// Application state around a mock-backed orchestrator.
pub fn app_state(
    dataset: Arc<dyn DatasetStore>,
    fetcher: Arc<dyn ContentFetcher>,
    config_manager: Arc<SiftConfigManager>,
) -> AppState {
    let orchestrator = orchestrator(dataset, fetcher, Arc::clone(&config_manager));
    AppState {
        config_manager,
        registry: Arc::clone(orchestrator.registry()),
        orchestrator: Arc::new(orchestrator),
    }
}
