//! HTTP API Handlers and Routes
//!
//! # API Endpoints
//!
//! ## Research (`/api/research`)
//! - `POST /api/research/start` - Start a research request, returns all sources as PENDING
//! - `GET /api/research/status/{request_id}` - Poll a request's progress
//!
//! ## Health
//! - `GET /health` - Liveness check
//!
//! All endpoints speak JSON and allow any origin.
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI document of the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::research::start_research,
        handlers::research::research_status,
        handlers::health::health_check,
    ),
    components(schemas(
        crate::types::StartResearchRequest,
        crate::types::HealthResponse,
        crate::types::ErrorResponse,
        crate::research::ResearchSnapshot,
        crate::research::SourceItemView,
        crate::research::SourceCategory,
        crate::research::ItemStatus,
        crate::research::RequestStatus,
    )),
    tags(
        (name = "research", description = "Research orchestration"),
        (name = "health", description = "Service health"),
    ),
    info(title = "Sift", description = "Research source orchestration API")
)]
pub struct ApiDoc;
