use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::AppState;
use super::models::*;
use crate::generator;
use crate::http::RequestDescriptor;
use crate::identity::OwnerId;
use crate::stats::{StatisticsSnapshot, summarize};

/// Execute a request on behalf of the caller and record it
///
/// Validation failures never reach the target; transport failures are
/// reported without touching history. A failed history write only flips
/// `savedToHistory` to false.
pub async fn execute_request(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
    payload: Result<Json<RequestDescriptor>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let Json(descriptor) = payload.map_err(|rejection| {
        debug!("Rejected request body from {}: {}", owner, rejection);
        api_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    })?;

    let request = state.normalizer.normalize(descriptor).map_err(|e| {
        debug!("Rejected request from {}: {}", owner, e);
        ApiError::from(e)
    })?;

    let result = state.client.execute(&request).await?;

    let saved = match state.recorder.record(&owner, &request, &result).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Failed to save request history: {}", e);
            false
        }
    };

    Ok(Json(ExecuteResponse::new(&request, &result, saved)))
}

/// List the caller's history, newest first
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryListResponse>, ApiError> {
    let page = state.recorder.list(&owner, query.page, query.limit).await?;

    Ok(Json(HistoryListResponse {
        history: page.records,
        pagination: page.pagination,
    }))
}

/// Delete one history record
///
/// Someone else's record is reported exactly like a missing one.
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if state.recorder.delete(&owner, &id).await? {
        info!("Deleted history record {} for {}", id, owner);
        Ok(Json(DeleteResponse {
            message: "History record deleted".to_string(),
            id,
        }))
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "History record not found",
        ))
    }
}

/// Render one of the caller's history records as a code snippet
pub async fn history_snippet(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
    query: Result<Query<SnippetQuery>, QueryRejection>,
) -> Result<Json<SnippetResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        api_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    })?;
    let record = state.recorder.find(&owner, &id).await?.ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "History record not found",
        )
    })?;

    Ok(Json(SnippetResponse {
        snippet: generator::render(query.format, (&record).into()),
        format: query.format,
        id,
    }))
}

/// Clear all of the caller's history
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<ClearResponse>, ApiError> {
    let count = state.recorder.clear(&owner).await?;
    info!("Cleared {} history records for {}", count, owner);

    Ok(Json(ClearResponse {
        message: format!("Deleted {} history records", count),
        count,
    }))
}

/// Usage statistics computed from the caller's full history
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<StatisticsSnapshot>, ApiError> {
    let records = state.recorder.all(&owner).await?;
    Ok(Json(summarize(&records)))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
