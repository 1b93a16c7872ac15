//! # Sift - Research Source Orchestration Server
//!
//! Given a research query, Sift resolves a list of candidate sources, fetches
//! each one concurrently under a parallelism cap, tracks every source through
//! a small lifecycle and exposes the aggregate progress to pollers.
//!
//! ## Overview
//!
//! Sift can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `sift-server` binary
//! 2. **As a library** - Embed the orchestrator into your own Rust project
//!
//! ### Library Example
//!
//! ```rust,ignore
//! use sift::{AppState, SiftConfig, SiftConfigManager, research::StartParams};
//! use std::sync::Arc;
//!
//! let config_manager = Arc::new(SiftConfigManager::from_config(SiftConfig::default()));
//! let state = AppState::from_config(config_manager)?;
//!
//! let started = state.orchestrator.start(StartParams::new("Ukraine Krieg")).await?;
//! let finished = state.orchestrator.join(&started.request_id).await?;
//! println!("{} sources, progress {}", finished.items.len(), finished.progress);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Interactive API documentation at `/swagger-ui/` |
//!
//! ## Modules
//!
//! - [`research`] - Resolver, orchestrator, request registry and data model
//! - [`sources`] - Dataset store and web search backends
//! - [`fetch`] - Content fetchers, HTML extraction and summarization
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command line interface of the `sift-server` binary
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - TOML configuration with hot reload

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command line interface.
pub mod cli;
/// Content fetching and summarization.
pub mod fetch;
/// Research orchestration.
pub mod research;
/// Source collaborators (dataset, web search).
pub mod sources;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

pub use research::{RequestRegistry, ResearchOrchestrator, SourceResolver};
pub use types::{AppError, Result};
pub use utils::toml_config::{SiftConfig, SiftConfigManager};

use crate::fetch::{ContentFetcher, HttpFetcher, RemoteFetcher, RemoteSummarizer};
use crate::sources::{DirectoryDataset, DuckDuckGoSearch, RemoteSearch, WebSearch};
use crate::utils::toml_config::{FetcherBackend, SearchBackend};
use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML-based configuration with hot-reload support
    pub config_manager: Arc<SiftConfigManager>,
    /// Registry of all research requests of this process
    pub registry: Arc<RequestRegistry>,
    /// Research orchestrator
    pub orchestrator: Arc<ResearchOrchestrator>,
}

impl AppState {
    /// Wire the orchestrator and its collaborators from configuration.
    pub fn from_config(config_manager: Arc<SiftConfigManager>) -> Result<Self> {
        let config = config_manager.config();
        let fetch_timeout = config.research.fetch_timeout();
        let max_chars = config.research.max_content_chars;

        let dataset = Arc::new(DirectoryDataset::new(config.dataset.directory.clone()));
        let mut resolver = SourceResolver::new(dataset, config.resolver.clone());

        let search: Option<Arc<dyn WebSearch>> = match config.search.backend {
            SearchBackend::None => None,
            SearchBackend::DuckDuckGo => Some(Arc::new(DuckDuckGoSearch::new())),
            SearchBackend::Remote => {
                let endpoint = config
                    .search
                    .endpoint
                    .clone()
                    .ok_or_else(|| AppError::Config("search.endpoint is not set".to_string()))?;
                let api_key = config.credential(config.search.api_key_env.as_deref())?;
                Some(Arc::new(RemoteSearch::new(
                    endpoint,
                    api_key,
                    Duration::from_secs(config.search.timeout_secs),
                )?))
            }
        };
        if let Some(search) = search {
            resolver = resolver.with_search(search);
        }

        let fetcher: Arc<dyn ContentFetcher> = match config.fetcher.backend {
            FetcherBackend::Direct => Arc::new(HttpFetcher::new(
                &config.fetcher.user_agent,
                fetch_timeout,
                max_chars,
            )?),
            FetcherBackend::Remote => {
                let endpoint = config
                    .fetcher
                    .endpoint
                    .clone()
                    .ok_or_else(|| AppError::Config("fetcher.endpoint is not set".to_string()))?;
                let api_key = config.credential(config.fetcher.api_key_env.as_deref())?;
                Arc::new(RemoteFetcher::new(
                    endpoint,
                    api_key,
                    fetch_timeout,
                    max_chars,
                )?)
            }
        };

        let registry = Arc::new(RequestRegistry::new());
        let mut orchestrator = ResearchOrchestrator::new(
            Arc::clone(&registry),
            Arc::new(resolver),
            fetcher,
            Arc::clone(&config_manager),
        );

        if config.summarizer.enabled {
            let endpoint = config
                .summarizer
                .endpoint
                .clone()
                .ok_or_else(|| AppError::Config("summarizer.endpoint is not set".to_string()))?;
            let api_key = config.credential(config.summarizer.api_key_env.as_deref())?;
            let summarizer = RemoteSummarizer::new(
                endpoint,
                api_key,
                Duration::from_secs(config.summarizer.timeout_secs),
            )?;
            orchestrator = orchestrator.with_summarizer(Arc::new(summarizer));
        }

        Ok(Self {
            config_manager,
            registry,
            orchestrator: Arc::new(orchestrator),
        })
    }
}

/// Build the HTTP application: `/health`, the `/api` routes, permissive
/// CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(api::handlers::health::health_check))
        .nest("/api", api::routes::create_router());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
