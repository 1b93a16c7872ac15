//! Pre-populated research dataset
//!
//! Research results gathered ahead of time are stored one JSON document per
//! normalized query. Entries carry their sources together with the article
//! text, so the orchestrator can mark them loaded without touching the network.

use crate::research::model::{InlineContent, ResolvedSource};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Normalize a query into a dataset key: spaces become underscores, lower case.
pub fn dataset_key(query: &str) -> String {
    query.replace(' ', "_").to_lowercase()
}

/// One stored research result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub sources: Vec<DatasetSource>,
    /// Free-form digest of the entry; not interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSource {
    pub title: String,
    pub url: String,
    /// Publishing site, e.g. "tagesschau.de"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl DatasetSource {
    /// Convert into a resolver candidate carrying its stored text inline.
    pub fn into_resolved(self) -> ResolvedSource {
        let inline = InlineContent {
            content: self.content.unwrap_or_default(),
            summary: self.snippet,
            author: self.author,
            published_at: self.published_at,
            content_length: self.length,
        };
        ResolvedSource::new(self.title, self.url).with_inline(inline)
    }
}

/// Keyed storage of research results.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Look up the entry stored for `query`. A missing entry is `Ok(None)`;
    /// an unreadable or malformed one is an error.
    async fn load(&self, query: &str) -> Result<Option<DatasetEntry>>;

    /// Store `entry` under `query`, replacing any previous entry.
    async fn save(&self, query: &str, entry: &DatasetEntry) -> Result<()>;
}

/// Dataset kept in memory, keyed by normalized query.
#[derive(Debug, Default)]
pub struct InMemoryDataset {
    entries: RwLock<HashMap<String, DatasetEntry>>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_entry(self, query: &str, entry: DatasetEntry) -> Self {
        self.entries.write().insert(dataset_key(query), entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl DatasetStore for InMemoryDataset {
    async fn load(&self, query: &str) -> Result<Option<DatasetEntry>> {
        Ok(self.entries.read().get(&dataset_key(query)).cloned())
    }

    async fn save(&self, query: &str, entry: &DatasetEntry) -> Result<()> {
        self.entries.write().insert(dataset_key(query), entry.clone());
        Ok(())
    }
}

/// Longest file name most filesystems accept.
const MAX_FILE_NAME_BYTES: usize = 255;

/// Dataset stored as `{directory}/{key}.json` files.
#[derive(Debug, Clone)]
pub struct DirectoryDataset {
    directory: PathBuf,
}

impl DirectoryDataset {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File backing `query`.
    pub fn path_for(&self, query: &str) -> PathBuf {
        self.directory.join(format!("{}.json", dataset_key(query)))
    }

    /// File backing `query`, or `None` when its key cannot name a file
    /// inside the dataset directory.
    pub fn checked_path(&self, query: &str) -> Option<PathBuf> {
        let key = dataset_key(query);
        let invalid = key.is_empty()
            || key.len() + ".json".len() > MAX_FILE_NAME_BYTES
            || key.contains(['/', '\\', '\0'])
            || key.contains("..");
        (!invalid).then(|| self.directory.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl DatasetStore for DirectoryDataset {
    async fn load(&self, query: &str) -> Result<Option<DatasetEntry>> {
        let Some(path) = self.checked_path(query) else {
            tracing::debug!(query, "Query cannot name a dataset file");
            return Ok(None);
        };

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Dataset(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let entry = serde_json::from_str(&raw).map_err(|e| {
            AppError::Dataset(format!("Malformed dataset file {}: {}", path.display(), e))
        })?;

        tracing::debug!(query, path = %path.display(), "Dataset entry loaded");
        Ok(Some(entry))
    }

    async fn save(&self, query: &str, entry: &DatasetEntry) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                AppError::Dataset(format!(
                    "Failed to create {}: {}",
                    self.directory.display(),
                    e
                ))
            })?;

        let path = self.checked_path(query).ok_or_else(|| {
            AppError::Dataset(format!("Query {:?} cannot name a dataset file", query))
        })?;
        let json = serde_json::to_string_pretty(entry)
            .map_err(|e| AppError::Dataset(format!("Failed to serialize entry: {}", e)))?;

        tokio::fs::write(&path, json).await.map_err(|e| {
            AppError::Dataset(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(query, path = %path.display(), "Dataset entry saved");
        Ok(())
    }
}
