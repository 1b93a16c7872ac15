//! Request Registry
//!
//! Process-lifetime map from request id to its [`ResearchRecord`]. One
//! registry is created at startup and handed to the orchestrator, so tests
//! can run as many isolated registries as they like. Records are never
//! evicted.

use crate::research::record::ResearchRecord;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct RequestRegistry {
    records: RwLock<HashMap<String, Arc<ResearchRecord>>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own id, replacing any previous entry.
    pub fn put(&self, record: Arc<ResearchRecord>) {
        self.records
            .write()
            .insert(record.id().to_string(), record);
    }

    pub fn get(&self, id: &str) -> Option<Arc<ResearchRecord>> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Ids of all known requests, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.records.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::record::RequestParams;

    fn record(id: &str) -> Arc<ResearchRecord> {
        Arc::new(ResearchRecord::new(
            id,
            RequestParams {
                query: "q".to_string(),
                sources: vec![],
                language: "de".to_string(),
                max_results: 1,
            },
        ))
    }

    #[test]
    fn test_put_and_get() {
        let registry = RequestRegistry::new();
        assert!(registry.is_empty());

        registry.put(record("a"));
        registry.put(record("b"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().id(), "a");
        assert!(registry.get("missing").is_none());

        let mut ids = registry.ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = RequestRegistry::new();
        let second = RequestRegistry::new();

        first.put(record("only-here"));

        assert!(first.get("only-here").is_some());
        assert!(second.get("only-here").is_none());
    }
}
