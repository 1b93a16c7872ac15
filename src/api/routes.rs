use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/research/start",
            post(crate::api::handlers::research::start_research),
        )
        .route(
            "/research/status/{request_id}",
            get(crate::api::handlers::research::research_status),
        )
}
