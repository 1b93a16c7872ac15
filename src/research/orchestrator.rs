//! Research Orchestrator
//!
//! Accepts a research request, resolves its sources once and fans the
//! resulting items out to the content fetcher. Callers get an all-PENDING
//! snapshot right away and poll [`ResearchOrchestrator::status`] afterwards.
//!
//! # Fan-out
//!
//! Every item gets its own task. A semaphore bounds how many are LOADING at
//! once, an optional rate limiter paces fetch starts and every fetch has its
//! own timeout. Each task owns exactly one item and turns every outcome,
//! including a panic, into a terminal item state. When all tasks are done
//! the request is completed, however many items failed.

use crate::fetch::{ContentFetcher, FetchError, Summarizer, summarize_or_truncate, truncate_words};
use crate::research::model::{
    InlineContent, ItemContent, ItemState, ItemStatus, ResearchSnapshot, SourceItem,
};
use crate::research::record::{RequestParams, ResearchRecord};
use crate::research::registry::RequestRegistry;
use crate::research::resolver::SourceResolver;
use crate::types::{AppError, Result};
use crate::utils::toml_config::SiftConfigManager;
use futures::future::join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

type FetchRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Input of [`ResearchOrchestrator::start`]. Unset fields take the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct StartParams {
    pub query: String,
    pub sources: Vec<String>,
    pub language: Option<String>,
    pub max_results: Option<usize>,
}

impl StartParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

pub struct ResearchOrchestrator {
    registry: Arc<RequestRegistry>,
    resolver: Arc<SourceResolver>,
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: Arc<SiftConfigManager>,
}

/// Everything the item tasks of one request share.
struct FanOut {
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: Option<Arc<dyn Summarizer>>,
    semaphore: Arc<Semaphore>,
    limiter: Option<FetchRateLimiter>,
    language: String,
    fetch_timeout: Duration,
    summary_max_words: usize,
    summarizer_timeout: Duration,
}

impl ResearchOrchestrator {
    pub fn new(
        registry: Arc<RequestRegistry>,
        resolver: Arc<SourceResolver>,
        fetcher: Arc<dyn ContentFetcher>,
        config: Arc<SiftConfigManager>,
    ) -> Self {
        Self {
            registry,
            resolver,
            fetcher,
            summarizer: None,
            config,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// Register a new request, resolve its sources and start fetching them.
    ///
    /// Returns the snapshot taken before any fetch started. A resolver error
    /// does not fail the call: the request is registered as failed and its
    /// snapshot returned.
    pub async fn start(&self, params: StartParams) -> Result<ResearchSnapshot> {
        let query = params.query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("query is required".to_string()));
        }

        let config = self.config.config();
        let settings = &config.research;

        let max_results = params
            .max_results
            .unwrap_or(settings.default_max_results)
            .clamp(1, settings.max_results_cap);
        let language = params
            .language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty())
            .unwrap_or_else(|| settings.default_language.clone());

        let record = Arc::new(ResearchRecord::new(
            uuid::Uuid::new_v4().to_string(),
            RequestParams {
                query: query.to_string(),
                sources: params.sources,
                language: language.clone(),
                max_results,
            },
        ));
        self.registry.put(Arc::clone(&record));

        info!(
            request_id = record.id(),
            query,
            max_results,
            language = %language,
            "Research request started"
        );

        let resolved = self
            .resolver
            .resolve(query, &record.params().sources, max_results)
            .await;

        let sources = match resolved {
            Ok(sources) => sources,
            Err(e) => {
                error!(request_id = record.id(), error = %e, "Source resolution failed");
                record.attach_items(Vec::new())?;
                record.fail(e.to_string());
                return Ok(record.snapshot());
            }
        };

        let items = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| SourceItem::discovered(record.id(), index, source))
            .collect();
        record.attach_items(items)?;

        let snapshot = record.snapshot();
        info!(
            request_id = record.id(),
            items = snapshot.items.len(),
            "Sources resolved"
        );

        let fan_out = Arc::new(FanOut {
            fetcher: Arc::clone(&self.fetcher),
            summarizer: self.summarizer.clone(),
            semaphore: Arc::new(Semaphore::new(settings.max_parallel.max(1))),
            limiter: settings
                .fetches_per_second
                .and_then(NonZeroU32::new)
                .map(|per_second| RateLimiter::direct(Quota::per_second(per_second))),
            language,
            fetch_timeout: settings.fetch_timeout(),
            summary_max_words: settings.summary_max_words,
            summarizer_timeout: Duration::from_secs(config.summarizer.timeout_secs),
        });

        let handle = tokio::spawn(run_fan_out(fan_out, Arc::clone(&record)));
        record.set_task(handle);

        Ok(snapshot)
    }

    /// Current snapshot of request `id`.
    pub fn status(&self, id: &str) -> Option<ResearchSnapshot> {
        self.registry.get(id).map(|record| record.snapshot())
    }

    /// Wait until the fan-out of request `id` has finished and return its
    /// final snapshot.
    pub async fn join(&self, id: &str) -> Result<ResearchSnapshot> {
        let record = self
            .registry
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Research request {} not found", id)))?;

        if let Some(handle) = record.take_task()
            && let Err(e) = handle.await
        {
            error!(request_id = id, error = %e, "Fan-out task aborted");
            record.fail(format!("fan-out task aborted: {}", e));
        }

        Ok(record.snapshot())
    }
}

async fn run_fan_out(fan_out: Arc<FanOut>, record: Arc<ResearchRecord>) {
    let handles: Vec<JoinHandle<()>> = (0..record.item_count())
        .map(|index| tokio::spawn(process_item(Arc::clone(&fan_out), Arc::clone(&record), index)))
        .collect();

    for (index, result) in join_all(handles).await.into_iter().enumerate() {
        if let Err(e) = result {
            warn!(request_id = record.id(), index, error = %e, "Item task panicked");
            fail_item(&record, index, format!("internal error: {}", e));
        }
    }

    if record.complete() {
        let snapshot = record.snapshot();
        info!(
            request_id = record.id(),
            items = snapshot.items.len(),
            success = snapshot.count(ItemStatus::Success),
            failed = snapshot.count(ItemStatus::Failed),
            no_content = snapshot.count(ItemStatus::NoContent),
            "Research request completed"
        );
    }
}

async fn process_item(fan_out: Arc<FanOut>, record: Arc<ResearchRecord>, index: usize) {
    let Ok(_permit) = Arc::clone(&fan_out.semaphore).acquire_owned().await else {
        fail_item(&record, index, "fetch slots closed".to_string());
        return;
    };

    if let Err(e) = record.begin_loading(index) {
        warn!(request_id = record.id(), index, error = %e, "Item not startable");
        return;
    }

    let Some(item) = record.item(index) else {
        return;
    };
    debug!(item = item.id(), url = item.url(), "Loading");

    let outcome = match item.inline() {
        Some(inline) => inline_outcome(inline, fan_out.summary_max_words),
        None => fetch_outcome(&fan_out, item.url()).await,
    };

    debug!(item = item.id(), status = ?outcome.status(), "Loaded");
    if let Err(e) = record.finish_item(index, outcome) {
        warn!(request_id = record.id(), index, error = %e, "Item result dropped");
    }
}

fn inline_outcome(inline: &InlineContent, summary_max_words: usize) -> ItemState {
    let summary = inline
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| truncate_words(&inline.content, summary_max_words));

    ItemState::from_content(ItemContent {
        content: inline.content.clone(),
        summary,
        author: inline.author.clone(),
        published_at: inline.published_at.clone(),
        content_length: inline
            .content_length
            .unwrap_or_else(|| inline.content.chars().count()),
    })
}

async fn fetch_outcome(fan_out: &FanOut, url: &str) -> ItemState {
    if let Some(limiter) = &fan_out.limiter {
        limiter.until_ready().await;
    }

    let fetched = tokio::time::timeout(
        fan_out.fetch_timeout,
        fan_out.fetcher.fetch(url, &fan_out.language),
    )
    .await
    .unwrap_or(Err(FetchError::Timeout(fan_out.fetch_timeout)));

    let page = match fetched {
        Ok(page) => page,
        Err(FetchError::NoContent) => return ItemState::NoContent,
        Err(e) => {
            debug!(url, error = %e, "Fetch failed");
            return ItemState::failed(e.to_string());
        }
    };

    let summary = match page.summary.filter(|summary| !summary.trim().is_empty()) {
        Some(summary) => summary,
        None => {
            summarize_or_truncate(
                fan_out.summarizer.as_deref(),
                &page.text,
                &fan_out.language,
                fan_out.summary_max_words,
                fan_out.summarizer_timeout,
            )
            .await
        }
    };

    ItemState::from_content(ItemContent {
        content_length: page.text.chars().count(),
        content: page.text,
        summary,
        author: page.author,
        published_at: page.published_at,
    })
}

/// Force item `index` into FAILED from whatever non-terminal state it is in.
fn fail_item(record: &ResearchRecord, index: usize, message: String) {
    let _ = record.begin_loading(index);
    if let Err(e) = record.finish_item(index, ItemState::failed(message)) {
        debug!(request_id = record.id(), index, error = %e, "Item already terminal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(content: &str) -> InlineContent {
        InlineContent {
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_inline_content_becomes_success() {
        let outcome = inline_outcome(
            &InlineContent {
                summary: Some("Kurz".to_string()),
                content_length: Some(1247),
                ..inline("Langer Text")
            },
            200,
        );

        match outcome {
            ItemState::Success(content) => {
                assert_eq!(content.content, "Langer Text");
                assert_eq!(content.summary, "Kurz");
                assert_eq!(content.content_length, 1247);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_without_summary_is_truncated() {
        let ItemState::Success(content) = inline_outcome(&inline("a b c d"), 2) else {
            panic!("expected success");
        };
        assert_eq!(content.summary, "a b...");
        assert_eq!(content.content_length, 7);
    }

    #[test]
    fn test_empty_inline_content_is_no_content() {
        assert_eq!(inline_outcome(&inline("  "), 10), ItemState::NoContent);
    }

    #[test]
    fn test_start_params_builder() {
        let params = StartParams::new("Ukraine Krieg")
            .with_sources(vec!["spiegel.de".to_string()])
            .with_language("en")
            .with_max_results(3);

        assert_eq!(params.query, "Ukraine Krieg");
        assert_eq!(params.language.as_deref(), Some("en"));
        assert_eq!(params.max_results, Some(3));
    }
}
