//! Bearer token middleware
//!
//! Resolves the `Authorization: Bearer <token>` header into an [`OwnerId`]
//! and makes it available to handlers via Axum's `Extension`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::AppState;
use super::models::{ApiError, api_error};
use crate::identity::OwnerId;

/// Rejects the request with 401 when the token is missing, malformed or invalid.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "MISSING_AUTH",
                "Missing Authorization header",
            )
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "INVALID_AUTH_FORMAT",
                "Invalid Authorization header format. Expected 'Bearer <token>'",
            )
        })?;

    let owner: OwnerId = state.identity.authenticate(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        api_error(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", e.to_string())
    })?;

    request.extensions_mut().insert(owner);
    Ok(next.run(request).await)
}
