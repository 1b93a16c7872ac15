//! Collaborators that supply candidate sources: the pre-populated dataset
//! and external web search.

/// Query-keyed research dataset (in-memory and JSON directory stores).
pub mod dataset;
/// Web search backends (DuckDuckGo, remote JSON API).
pub mod search;

pub use dataset::{DatasetEntry, DatasetSource, DatasetStore, DirectoryDataset, InMemoryDataset};
pub use search::{DuckDuckGoSearch, RemoteSearch, SearchHit, WebSearch};
