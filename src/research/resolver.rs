//! Source Resolver
//!
//! Turns a query into an ordered, bounded list of candidate sources. The
//! first strategy that yields anything wins:
//!
//! 1. the dataset entry stored for the exact query
//! 2. dataset entries for the lower-cased query, its first word, then each
//!    configured topic keyword the query mentions
//! 3. external web search, once per hinted domain
//! 4. the configured list of generic top-level sites
//!
//! Only a broken dataset makes resolution fail. A failing search is skipped;
//! the generic list is used when no search produced anything.

use crate::research::model::ResolvedSource;
use crate::sources::{DatasetEntry, DatasetStore, WebSearch};
use crate::types::Result;
use crate::utils::toml_config::ResolverConfig;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SourceResolver {
    dataset: Arc<dyn DatasetStore>,
    search: Option<Arc<dyn WebSearch>>,
    config: ResolverConfig,
}

impl SourceResolver {
    pub fn new(dataset: Arc<dyn DatasetStore>, config: ResolverConfig) -> Self {
        Self {
            dataset,
            search: None,
            config,
        }
    }

    /// Enable the web search step.
    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub async fn resolve(
        &self,
        query: &str,
        source_hints: &[String],
        max_results: usize,
    ) -> Result<Vec<ResolvedSource>> {
        if let Some(entry) = self.dataset.load(query).await? {
            info!(query, sources = entry.sources.len(), "Resolved from dataset");
            return Ok(Self::from_entry(entry, max_results));
        }

        for key in self.fallback_keys(query) {
            if let Some(entry) = self.dataset.load(&key).await?
                && !entry.sources.is_empty()
            {
                info!(
                    query,
                    key = %key,
                    sources = entry.sources.len(),
                    "Resolved from dataset fallback"
                );
                return Ok(Self::from_entry(entry, max_results));
            }
        }

        if let Some(search) = &self.search {
            let found = self
                .search_web(search.as_ref(), query, source_hints, max_results)
                .await;
            if !found.is_empty() {
                info!(
                    query,
                    backend = search.name(),
                    hits = found.len(),
                    "Resolved from web search"
                );
                return Ok(found);
            }
            debug!(query, "Web search found nothing");
        }

        Ok(self.generic(query, max_results))
    }

    /// Dataset keys tried after the exact query, in order, without repeats.
    fn fallback_keys(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        let mut keys = vec![lowered.clone()];

        if let Some(first) = lowered.split_whitespace().next() {
            keys.push(first.to_string());
        }

        keys.extend(
            self.config
                .fallback_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .filter(|keyword| lowered.contains(keyword.as_str())),
        );

        let mut seen = HashSet::new();
        keys.retain(|key| !key.is_empty() && seen.insert(key.clone()));
        keys
    }

    fn from_entry(entry: DatasetEntry, max_results: usize) -> Vec<ResolvedSource> {
        entry
            .sources
            .into_iter()
            .take(max_results)
            .map(|source| source.into_resolved())
            .collect()
    }

    /// Hits of every per-hint search, deduplicated by URL. A failing search
    /// is skipped; hits of the others are kept.
    async fn search_web(
        &self,
        search: &dyn WebSearch,
        query: &str,
        source_hints: &[String],
        max_results: usize,
    ) -> Vec<ResolvedSource> {
        let queries: Vec<String> = if source_hints.is_empty() {
            vec![query.to_string()]
        } else {
            source_hints
                .iter()
                .map(|domain| format!("site:{} {}", domain.trim(), query))
                .collect()
        };

        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for search_query in queries {
            let hits = match search.search(&search_query, max_results).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query = %search_query, error = %e, "Web search failed");
                    continue;
                }
            };
            for hit in hits {
                if found.len() >= max_results {
                    return found;
                }
                if seen.insert(hit.url.clone()) {
                    found.push(ResolvedSource::new(hit.title, hit.url));
                }
            }
        }

        found
    }

    fn generic(&self, query: &str, max_results: usize) -> Vec<ResolvedSource> {
        debug!(query, "Falling back to generic sources");
        self.config
            .generic_sources
            .iter()
            .take(max_results)
            .map(|site| ResolvedSource::new(format!("{}: {}", site.title, query), site.url.clone()))
            .collect()
    }
}
