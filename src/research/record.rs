//! Shared, concurrently readable state of one research request.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::OnceLock;
use tokio::task::JoinHandle;

use crate::research::model::{
    InvalidTransition, ItemState, ItemStatus, RequestStatus, ResearchSnapshot, SourceItem,
};
use crate::types::{AppError, Result};

/// Parameters a request was started with, after defaults and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub query: String,
    pub sources: Vec<String>,
    pub language: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Running,
    Completed,
    Failed(String),
}

/// A research request as stored in the registry.
///
/// Each item sits behind its own lock and is replaced as a whole on every
/// transition, so pollers never see a half-applied state. The item list is
/// attached once and cannot grow afterwards.
pub struct ResearchRecord {
    id: String,
    params: RequestParams,
    created_at: DateTime<Utc>,
    phase: RwLock<Phase>,
    items: OnceLock<Vec<RwLock<SourceItem>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ResearchRecord {
    pub fn new(id: impl Into<String>, params: RequestParams) -> Self {
        Self {
            id: id.into(),
            params,
            created_at: Utc::now(),
            phase: RwLock::new(Phase::Running),
            items: OnceLock::new(),
            task: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> RequestStatus {
        match &*self.phase.read() {
            Phase::Running => RequestStatus::Running,
            Phase::Completed => RequestStatus::Completed,
            Phase::Failed(_) => RequestStatus::Failed,
        }
    }

    pub fn error(&self) -> Option<String> {
        match &*self.phase.read() {
            Phase::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Attach the discovered items. Fails if items were already attached.
    pub fn attach_items(&self, items: Vec<SourceItem>) -> Result<()> {
        self.items
            .set(items.into_iter().map(RwLock::new).collect())
            .map_err(|_| {
                AppError::Internal(format!("items of request {} already attached", self.id))
            })
    }

    pub fn item_count(&self) -> usize {
        self.items.get().map_or(0, Vec::len)
    }

    /// Copy of the item at `index`.
    pub fn item(&self, index: usize) -> Option<SourceItem> {
        self.items
            .get()
            .and_then(|items| items.get(index))
            .map(|item| item.read().clone())
    }

    /// PENDING -> LOADING for item `index`.
    pub fn begin_loading(&self, index: usize) -> std::result::Result<(), InvalidTransition> {
        self.with_item(index, ItemStatus::Loading, SourceItem::begin_loading)
    }

    /// LOADING -> terminal for item `index`.
    pub fn finish_item(
        &self,
        index: usize,
        outcome: ItemState,
    ) -> std::result::Result<(), InvalidTransition> {
        let to = outcome.status();
        self.with_item(index, to, |item| item.finish(outcome))
    }

    fn with_item<F>(
        &self,
        index: usize,
        to: ItemStatus,
        apply: F,
    ) -> std::result::Result<(), InvalidTransition>
    where
        F: FnOnce(&mut SourceItem) -> std::result::Result<(), InvalidTransition>,
    {
        match self.items.get().and_then(|items| items.get(index)) {
            Some(item) => apply(&mut item.write()),
            None => Err(InvalidTransition {
                from: ItemStatus::Pending,
                to,
            }),
        }
    }

    /// Mark the request completed. Only a running request can complete.
    pub fn complete(&self) -> bool {
        let mut phase = self.phase.write();
        if *phase == Phase::Running {
            *phase = Phase::Completed;
            true
        } else {
            false
        }
    }

    /// Mark the request failed. Only a running request can fail.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let mut phase = self.phase.write();
        if *phase == Phase::Running {
            *phase = Phase::Failed(message.into());
            true
        } else {
            false
        }
    }

    /// Fraction of items in a terminal state.
    ///
    /// Zero items yield 0.0 while running and 1.0 once completed.
    pub fn progress(&self) -> f64 {
        let done = self.items.get().map_or(0, |items| {
            items
                .iter()
                .filter(|item| item.read().status().is_terminal())
                .count()
        });
        progress_of(done, self.item_count(), self.status())
    }

    /// Consistent view of the request. The phase is read before the items,
    /// so a completed snapshot never shows a non-terminal item.
    pub fn snapshot(&self) -> ResearchSnapshot {
        let (status, error) = match self.phase.read().clone() {
            Phase::Running => (RequestStatus::Running, None),
            Phase::Completed => (RequestStatus::Completed, None),
            Phase::Failed(message) => (RequestStatus::Failed, Some(message)),
        };
        let items: Vec<_> = self
            .items
            .get()
            .map(|items| items.iter().map(|item| item.read().view()).collect())
            .unwrap_or_default();

        let done = items
            .iter()
            .filter(|item| item.status.is_terminal())
            .count();
        let progress = progress_of(done, items.len(), status);

        ResearchSnapshot {
            request_id: self.id.clone(),
            query: self.params.query.clone(),
            sources: self.params.sources.clone(),
            language: self.params.language.clone(),
            max_results: self.params.max_results,
            created_at: self.created_at,
            status,
            error,
            items,
            progress,
        }
    }

    /// Retain the handle of the fan-out task.
    pub fn set_task(&self, handle: JoinHandle<()>) {
        *self.task.lock() = Some(handle);
    }

    /// Take the retained fan-out handle, if it has not been taken yet.
    pub fn take_task(&self) -> Option<JoinHandle<()>> {
        self.task.lock().take()
    }
}

fn progress_of(done: usize, total: usize, status: RequestStatus) -> f64 {
    if total == 0 {
        return if status == RequestStatus::Completed {
            1.0
        } else {
            0.0
        };
    }
    done as f64 / total as f64
}

impl std::fmt::Debug for ResearchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchRecord")
            .field("id", &self.id)
            .field("query", &self.params.query)
            .field("status", &self.status())
            .field("items", &self.item_count())
            .finish()
    }
}
