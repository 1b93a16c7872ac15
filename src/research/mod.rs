//! Deep research orchestration
//!
//! Given a query, the research workflow resolves candidate sources, fetches
//! each of them concurrently under a parallelism cap and tracks every source
//! through a small lifecycle:
//!
//! ```text
//! PENDING -> LOADING -> SUCCESS | FAILED | NO_CONTENT
//! ```
//!
//! The request itself goes from `running` to `completed` once every item is
//! terminal, or to `failed` when its sources could not be resolved.
//!
//! # Usage
//!
//! ```ignore
//! use sift::research::{ResearchOrchestrator, StartParams};
//!
//! let snapshot = orchestrator.start(StartParams::new("Ukraine Krieg")).await?;
//! let done = orchestrator.join(&snapshot.request_id).await?;
//!
//! for item in done.items {
//!     println!("{:?} {}", item.status, item.url);
//! }
//! ```

/// URL based source categories.
pub mod classify;
/// Items, lifecycle states and snapshots.
pub mod model;
/// Request start and fan-out.
pub mod orchestrator;
/// Shared state of one request.
pub mod record;
/// Request id lookup.
pub mod registry;
/// Query to candidate source resolution.
pub mod resolver;

pub use classify::determine_source_type;
pub use model::{
    ItemStatus, RequestStatus, ResearchSnapshot, ResolvedSource, SourceCategory, SourceItem,
    SourceItemView,
};
pub use orchestrator::{ResearchOrchestrator, StartParams};
pub use record::ResearchRecord;
pub use registry::RequestRegistry;
pub use resolver::SourceResolver;
