//! TOML-based configuration for Sift
//!
//! This module provides declarative configuration for the HTTP server, the
//! research orchestrator and its pluggable collaborators (dataset store, web
//! search, fetcher, summarizer) via a TOML file (`sift.toml`).
//!
//! # Hot Reloading
//!
//! Configuration changes are detected and applied at runtime. The
//! orchestrator reads its `[research]` settings for every new request, so a
//! reload changes concurrency, timeouts and result caps for subsequent
//! requests. Collaborator sections are read once at startup.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Root configuration structure loaded from sift.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiftConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Orchestration limits (hot-reloadable)
    #[serde(default)]
    pub research: ResearchConfig,

    /// Source resolution fallbacks
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Pre-fetched research dataset
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// External web search
    #[serde(default)]
    pub search: SearchConfig,

    /// Page fetching
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Optional summarization service
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum number of fetches in flight for one request
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Result count used when a request does not specify one
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Upper bound applied to any requested result count
    #[serde(default = "default_max_results_cap")]
    pub max_results_cap: usize,

    /// Timeout of a single fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Optional pacing of fetch starts within one request
    #[serde(default)]
    pub fetches_per_second: Option<u32>,

    /// Word budget of a summary
    #[serde(default = "default_summary_max_words")]
    pub summary_max_words: usize,

    /// Character budget of extracted page text
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Language used when a request does not specify one
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_max_parallel() -> usize {
    5
}

fn default_max_results() -> usize {
    20
}

fn default_max_results_cap() -> usize {
    50
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_summary_max_words() -> usize {
    200
}

fn default_max_content_chars() -> usize {
    10_000
}

fn default_language() -> String {
    "de".to_string()
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            default_max_results: default_max_results(),
            max_results_cap: default_max_results_cap(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetches_per_second: None,
            summary_max_words: default_summary_max_words(),
            max_content_chars: default_max_content_chars(),
            default_language: default_language(),
        }
    }
}

impl ResearchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// ============= Resolver Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Topic keywords tried as dataset keys when the query itself misses
    #[serde(default = "default_fallback_keywords")]
    pub fallback_keywords: Vec<String>,

    /// Top-level sites returned when nothing else matches
    #[serde(default = "default_generic_sources")]
    pub generic_sources: Vec<GenericSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericSource {
    pub title: String,
    pub url: String,
}

fn default_fallback_keywords() -> Vec<String> {
    ["ukraine", "klimawandel", "pharmaindustrie", "künstliche intelligenz"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_generic_sources() -> Vec<GenericSource> {
    [
        ("Tagesschau - Aktuelle Nachrichten", "https://www.tagesschau.de/"),
        ("Der Spiegel - Nachrichten", "https://www.spiegel.de/"),
        ("Die Zeit - Nachrichten", "https://www.zeit.de/"),
        ("Süddeutsche Zeitung", "https://www.sueddeutsche.de/"),
        ("FAZ - Nachrichten", "https://www.faz.net/"),
    ]
    .into_iter()
    .map(|(title, url)| GenericSource {
        title: title.to_string(),
        url: url.to_string(),
    })
    .collect()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fallback_keywords: default_fallback_keywords(),
            generic_sources: default_generic_sources(),
        }
    }
}

// ============= Dataset Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory holding one JSON file per normalized query
    #[serde(default = "default_dataset_directory")]
    pub directory: PathBuf,
}

fn default_dataset_directory() -> PathBuf {
    PathBuf::from("./data/research")
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            directory: default_dataset_directory(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// No external search; the resolver goes straight to the generic list
    #[default]
    None,
    /// DuckDuckGo via daedra
    DuckDuckGo,
    /// JSON search API reachable at `endpoint`
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub backend: SearchBackend,

    pub endpoint: Option<String>,

    /// Environment variable containing the bearer token for the remote API
    pub api_key_env: Option<String>,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::default(),
            endpoint: None,
            api_key_env: None,
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

// ============= Fetcher Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// GET the page and extract text locally
    #[default]
    Direct,
    /// Delegate to a crawler API reachable at `endpoint`
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub backend: FetcherBackend,

    pub endpoint: Option<String>,

    pub api_key_env: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: FetcherBackend::default(),
            endpoint: None,
            api_key_env: None,
            user_agent: default_user_agent(),
        }
    }
}

// ============= Summarizer Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub enabled: bool,

    pub endpoint: Option<String>,

    pub api_key_env: Option<String>,

    #[serde(default = "default_summarizer_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_summarizer_timeout_secs() -> u64 {
    20
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key_env: None,
            timeout_secs: default_summarizer_timeout_secs(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Section [{0}] uses backend 'remote' but has no endpoint")]
    MissingEndpoint(&'static str),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl SiftConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: SiftConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate ranges and that referenced env vars are available
    pub fn validate(&self) -> Result<(), ConfigError> {
        let research = &self.research;

        if research.max_parallel == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_parallel must be at least 1".to_string(),
            ));
        }
        if research.max_results_cap == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_results_cap must be at least 1".to_string(),
            ));
        }
        if research.default_max_results == 0
            || research.default_max_results > research.max_results_cap
        {
            return Err(ConfigError::ValidationError(format!(
                "research.default_max_results must be between 1 and {}",
                research.max_results_cap
            )));
        }
        if research.fetch_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if research.fetches_per_second == Some(0) {
            return Err(ConfigError::ValidationError(
                "research.fetches_per_second must be positive when set".to_string(),
            ));
        }
        if research.summary_max_words == 0 || research.max_content_chars == 0 {
            return Err(ConfigError::ValidationError(
                "research.summary_max_words and research.max_content_chars must be positive"
                    .to_string(),
            ));
        }

        for source in &self.resolver.generic_sources {
            if source.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "resolver.generic_sources entry '{}' has an empty url",
                    source.title
                )));
            }
        }

        if self.search.backend == SearchBackend::Remote && self.search.endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint("search"));
        }
        if self.fetcher.backend == FetcherBackend::Remote && self.fetcher.endpoint.is_none() {
            return Err(ConfigError::MissingEndpoint("fetcher"));
        }
        if self.summarizer.enabled && self.summarizer.endpoint.is_none() {
            return Err(ConfigError::ValidationError(
                "summarizer.enabled requires summarizer.endpoint".to_string(),
            ));
        }

        for env in [
            &self.search.api_key_env,
            &self.fetcher.api_key_env,
            &self.summarizer.api_key_env,
        ]
        .into_iter()
        .flatten()
        {
            self.validate_env_var(env)?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Resolve an optional credential reference; a named but unset variable is an error
    pub fn credential(&self, env_name: Option<&str>) -> Result<Option<String>, ConfigError> {
        match env_name {
            Some(name) => self
                .resolve_env(name)
                .map(Some)
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string())),
            None => Ok(None),
        }
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct SiftConfigManager {
    config: Arc<ArcSwap<SiftConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl SiftConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = SiftConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config. No file watching.
    pub fn from_config(config: SiftConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("sift.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<SiftConfig> {
        self.config.load_full()
    }

    /// Replace the current configuration after validating it
    pub fn replace(&self, config: SiftConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config.store(Arc::new(config));
        Ok(())
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = SiftConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching the configuration file for changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Editors replace files, so watch the parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|at| at.elapsed() < debounce) {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match SiftConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 9000
log_level = "debug"
log_format = "json"

[research]
max_parallel = 3
default_max_results = 10
fetch_timeout_secs = 5
fetches_per_second = 2

[resolver]
fallback_keywords = ["ukraine"]

[[resolver.generic_sources]]
title = "Example"
url = "https://example.org/"

[dataset]
directory = "/tmp/sift-data"

[search]
backend = "duckduckgo"
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let content = create_test_config();
        let config: SiftConfig = toml::from_str(&content).expect("Failed to parse config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.research.max_parallel, 3);
        assert_eq!(config.research.fetches_per_second, Some(2));
        assert_eq!(config.resolver.generic_sources.len(), 1);
        assert_eq!(config.dataset.directory, PathBuf::from("/tmp/sift-data"));
        assert_eq!(config.search.backend, SearchBackend::DuckDuckGo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: SiftConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.log_format, LogFormat::Pretty);

        assert_eq!(config.research.max_parallel, 5);
        assert_eq!(config.research.default_max_results, 20);
        assert_eq!(config.research.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.research.summary_max_words, 200);
        assert_eq!(config.research.default_language, "de");
        assert!(config.research.fetches_per_second.is_none());

        assert_eq!(config.resolver.generic_sources.len(), 5);
        assert!(
            config
                .resolver
                .fallback_keywords
                .contains(&"ukraine".to_string())
        );

        assert_eq!(config.search.backend, SearchBackend::None);
        assert_eq!(config.fetcher.backend, FetcherBackend::Direct);
        assert!(!config.summarizer.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_parallel() {
        let config: SiftConfig = toml::from_str("[research]\nmax_parallel = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_default_results_above_cap() {
        let config: SiftConfig = toml::from_str(
            "[research]\ndefault_max_results = 30\nmax_results_cap = 10\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_zero_rate() {
        let config: SiftConfig =
            toml::from_str("[research]\nfetches_per_second = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_remote_search_needs_endpoint() {
        let config: SiftConfig = toml::from_str("[search]\nbackend = \"remote\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEndpoint("search"))
        ));
    }

    #[test]
    fn test_validation_missing_env_var() {
        let config: SiftConfig = toml::from_str(
            r#"
[summarizer]
enabled = true
endpoint = "http://localhost:9/summarize"
api_key_env = "SIFT_TEST_SURELY_UNSET_VARIABLE"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_credential_resolution() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SIFT_TEST_CREDENTIAL", "secret-token");
        }

        let config = SiftConfig::default();
        assert_eq!(
            config.credential(Some("SIFT_TEST_CREDENTIAL")).unwrap(),
            Some("secret-token".to_string())
        );
        assert_eq!(config.credential(None).unwrap(), None);
        assert!(config.credential(Some("SIFT_TEST_NOT_SET_ANYWHERE")).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = SiftConfig::load("/definitely/not/here/sift.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_manager_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sift.toml");
        fs::write(&path, "[research]\nmax_parallel = 2\n").unwrap();

        let manager = SiftConfigManager::new(&path).unwrap();
        assert_eq!(manager.config().research.max_parallel, 2);

        fs::write(&path, "[research]\nmax_parallel = 7\n").unwrap();
        manager.reload().unwrap();
        assert_eq!(manager.config().research.max_parallel, 7);
    }

    #[tokio::test]
    async fn test_manager_watch_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sift.toml");
        fs::write(&path, "[research]\nmax_parallel = 2\n").unwrap();

        let manager = SiftConfigManager::new(&path).unwrap();
        assert_eq!(manager.path(), path.as_path());

        manager.start_watching().unwrap();
        assert!(manager.watcher.read().is_some());

        manager.stop_watching();
        assert!(manager.watcher.read().is_none());
    }

    #[test]
    fn test_manager_replace_rejects_invalid() {
        let manager = SiftConfigManager::from_config(SiftConfig::default());

        let mut invalid = SiftConfig::default();
        invalid.research.max_parallel = 0;

        assert!(manager.replace(invalid).is_err());
        assert_eq!(manager.config().research.max_parallel, 5);
    }
}
