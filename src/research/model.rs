//! Research request and source item data model.
//!
//! Internally an item's lifecycle is an [`ItemState`] whose variants carry
//! their own payload, so a successful item always has content and a failed
//! item always has an error. The flattened [`SourceItemView`] is what goes
//! over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::research::classify::determine_source_type;

/// Category of a source, derived from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    News,
    Science,
    Government,
    Legal,
    Archive,
    Multimedia,
}

impl SourceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Science => "science",
            Self::Government => "government",
            Self::Legal => "legal",
            Self::Archive => "archive",
            Self::Multimedia => "multimedia",
        }
    }
}

/// Lifecycle stage of a source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Loading,
    Success,
    Failed,
    NoContent,
}

impl ItemStatus {
    /// Terminal states never change again and count toward progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::NoContent)
    }
}

/// Overall status of a research request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Running,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Content delivered together with a discovered source, making a fetch unnecessary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineContent {
    pub content: String,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    /// Length reported by the dataset; falls back to the content's char count
    pub content_length: Option<usize>,
}

/// One candidate produced by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub title: String,
    pub url: String,
    pub inline: Option<InlineContent>,
}

impl ResolvedSource {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            inline: None,
        }
    }

    pub fn with_inline(mut self, inline: InlineContent) -> Self {
        self.inline = Some(inline);
        self
    }
}

/// Payload of a successfully loaded item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemContent {
    pub content: String,
    pub summary: String,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub content_length: usize,
}

/// Lifecycle state with the data each stage owns.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Pending,
    Loading,
    Success(ItemContent),
    Failed { error: String },
    NoContent,
}

impl ItemState {
    /// Success when there is text to show, otherwise NoContent.
    pub fn from_content(content: ItemContent) -> Self {
        if content.content.trim().is_empty() {
            Self::NoContent
        } else {
            Self::Success(content)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Pending => ItemStatus::Pending,
            Self::Loading => ItemStatus::Loading,
            Self::Success(_) => ItemStatus::Success,
            Self::Failed { .. } => ItemStatus::Failed,
            Self::NoContent => ItemStatus::NoContent,
        }
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid item transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: ItemStatus,
    pub to: ItemStatus,
}

/// A discovered source tracked through its fetch lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    id: String,
    title: String,
    url: String,
    category: SourceCategory,
    inline: Option<InlineContent>,
    state: ItemState,
}

impl SourceItem {
    /// Wrap a resolved source as item `index` of `request_id`, classifying its URL.
    pub fn discovered(request_id: &str, index: usize, source: ResolvedSource) -> Self {
        let category = determine_source_type(&source.url);
        Self {
            id: format!("{}_{}", request_id, index),
            title: source.title,
            url: source.url,
            category,
            inline: source.inline,
            state: ItemState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn category(&self) -> SourceCategory {
        self.category
    }

    pub fn inline(&self) -> Option<&InlineContent> {
        self.inline.as_ref()
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    pub fn status(&self) -> ItemStatus {
        self.state.status()
    }

    /// PENDING -> LOADING
    pub fn begin_loading(&mut self) -> Result<(), InvalidTransition> {
        if self.state != ItemState::Pending {
            return Err(InvalidTransition {
                from: self.status(),
                to: ItemStatus::Loading,
            });
        }
        self.state = ItemState::Loading;
        Ok(())
    }

    /// LOADING -> terminal
    pub fn finish(&mut self, outcome: ItemState) -> Result<(), InvalidTransition> {
        let to = outcome.status();
        if self.state != ItemState::Loading || !to.is_terminal() {
            return Err(InvalidTransition {
                from: self.status(),
                to,
            });
        }
        self.state = outcome;
        Ok(())
    }

    /// Flattened, serializable view of the current state.
    pub fn view(&self) -> SourceItemView {
        let mut view = SourceItemView {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            source_type: self.category,
            status: self.status(),
            content: None,
            summary: None,
            author: None,
            published_at: None,
            content_length: 0,
            error: None,
        };

        match &self.state {
            ItemState::Success(loaded) => {
                view.content = Some(loaded.content.clone());
                view.summary = Some(loaded.summary.clone());
                view.author = loaded.author.clone();
                view.published_at = loaded.published_at.clone();
                view.content_length = loaded.content_length;
            }
            ItemState::Failed { error } => view.error = Some(error.clone()),
            ItemState::Pending | ItemState::Loading | ItemState::NoContent => {}
        }

        view
    }
}

/// Wire representation of a source item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceItemView {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source_type: SourceCategory,
    pub status: ItemStatus,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub content_length: usize,
    pub error: Option<String>,
}

/// Point-in-time view of a research request, as returned to pollers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSnapshot {
    pub request_id: String,
    pub query: String,
    pub sources: Vec<String>,
    pub language: String,
    pub max_results: usize,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub items: Vec<SourceItemView>,
    pub progress: f64,
}

impl ResearchSnapshot {
    pub fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }
}
