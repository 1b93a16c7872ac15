use crate::{
    AppState,
    research::{ResearchSnapshot, StartParams},
    types::{AppError, Result, StartResearchRequest},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

/// Start a research request
///
/// Resolves candidate sources for the query and starts fetching them in the
/// background. The response lists every source in PENDING state; poll the
/// status endpoint for progress.
#[utoipa::path(
    post,
    path = "/api/research/start",
    request_body = StartResearchRequest,
    responses(
        (status = 200, description = "Research started", body = ResearchSnapshot),
        (status = 400, description = "Missing query or malformed body", body = crate::types::ErrorResponse)
    ),
    tag = "research"
)]
pub async fn start_research(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StartResearchRequest>, JsonRejection>,
) -> Result<Json<ResearchSnapshot>> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let query = payload
        .query
        .filter(|query| !query.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("query is required".to_string()))?;

    let params = StartParams {
        query,
        sources: payload.sources,
        language: payload.language,
        max_results: payload.max_results,
    };

    let snapshot = state.orchestrator.start(params).await?;
    Ok(Json(snapshot))
}

/// Get the current state of a research request
#[utoipa::path(
    get,
    path = "/api/research/status/{request_id}",
    params(
        ("request_id" = String, Path, description = "Id returned by the start endpoint")
    ),
    responses(
        (status = 200, description = "Current snapshot", body = ResearchSnapshot),
        (status = 404, description = "Unknown request id", body = crate::types::ErrorResponse)
    ),
    tag = "research"
)]
pub async fn research_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<ResearchSnapshot>> {
    state
        .orchestrator
        .status(&request_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Research request {} not found", request_id)))
}
