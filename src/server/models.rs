use std::collections::BTreeMap;

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::generator::{self, SnippetFormat};
use crate::history::{HistoryRecord, Pagination};
use crate::http::{ExecutionResult, HeaderList, Method, NormalizedRequest, ResponseBody};
use crate::utils::serialization;
use crate::{ErrorKind, PostbenchError};

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: Some(code.to_string()),
        }),
    )
}

impl From<PostbenchError> for ApiError {
    fn from(err: PostbenchError) -> Self {
        let (status, code) = match (&err, err.kind()) {
            (PostbenchError::Timeout(_), _) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            (_, ErrorKind::Validation) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (_, ErrorKind::Transport) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            (_, ErrorKind::Persistence) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            (_, ErrorKind::Authorization) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (_, ErrorKind::Internal) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        api_error(status, code, err.to_string())
    }
}

/// 实际发送的请求 (回显给调用方)
#[derive(Debug, Clone, Serialize)]
pub struct RequestEcho {
    pub url: String,
    pub method: Method,
    pub headers: HeaderList,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
    /// 毫秒
    pub timing: u64,
    /// 字节
    pub size: u64,
}

/// `POST /api/request` 的响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub request: RequestEcho,
    pub response: ResponseView,
    pub saved_to_history: bool,
    /// 等价的 `fetch(...)` 代码
    pub snippet: String,
}

impl ExecuteResponse {
    pub fn new(request: &NormalizedRequest, result: &ExecutionResult, saved_to_history: bool) -> Self {
        Self {
            request: RequestEcho {
                url: request.url.to_string(),
                method: request.method,
                headers: request.headers.clone(),
                body: request.body.clone(),
            },
            response: ResponseView {
                status: result.status.code(),
                status_text: result.status_text.clone(),
                headers: serialization::header_map::to_object(&result.headers),
                body: result.body.clone(),
                timing: result.timing_ms(),
                size: result.size_bytes,
            },
            saved_to_history,
            snippet: generator::render(SnippetFormat::Fetch, request.into()),
        }
    }
}

/// `GET /api/history` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// `GET /api/history/{id}/snippet` 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetQuery {
    #[serde(default)]
    pub format: SnippetFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnippetResponse {
    pub id: String,
    pub format: SnippetFormat,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryListResponse {
    pub history: Vec<HistoryRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (PostbenchError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (PostbenchError::Timeout("x".into()), StatusCode::GATEWAY_TIMEOUT),
            (PostbenchError::NetworkError("x".into()), StatusCode::BAD_GATEWAY),
            (PostbenchError::TaskFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (PostbenchError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            let (status, _) = ApiError::from(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_validation_error_body() {
        let (_, Json(body)) = ApiError::from(PostbenchError::InvalidUrl("'nope'".into()));
        assert_eq!(body.code.as_deref(), Some("VALIDATION_ERROR"));
        assert_eq!(body.error, "无效的 URL: 'nope'");
    }
}
