//! API request handlers.

/// Liveness handler.
pub mod health;
/// Research start and status handlers.
pub mod research;
