use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::http::types::Status;

/// 响应体：能解析为 JSON 就保存解析结果，否则保留原始文本
///
/// 序列化时不带标签 (JSON 值原样输出，文本输出为字符串)。反序列化时字符串
/// 一律还原为 `Raw`，所以顶层为字符串的 JSON 响应读回后是 `Raw`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Raw(String),
    Json(Value),
}

impl ResponseBody {
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return ResponseBody::Raw(text);
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(text),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Raw(_) => None,
        }
    }

    /// 用于展示的文本，JSON 会被美化
    pub fn to_display_string(&self) -> String {
        match self {
            ResponseBody::Raw(text) => text.clone(),
            ResponseBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Raw(String::new())
    }
}

/// 一次完整外呼的结果 (任何 HTTP 状态码都算完成)
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: Status,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: ResponseBody,
    pub duration: Duration,
    /// 原始响应体字节数
    pub size_bytes: u64,
}

impl ExecutionResult {
    pub fn new(status: u16, headers: HeaderMap, raw_body: &[u8], duration: Duration) -> Result<Self> {
        let status = Status::new(status)?;
        let text = String::from_utf8_lossy(raw_body).into_owned();
        Ok(Self {
            status_text: status.reason_phrase().to_string(),
            status,
            headers,
            body: ResponseBody::from_text(text),
            duration,
            size_bytes: raw_body.len() as u64,
        })
    }

    pub fn timing_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirect()
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_parsed() {
        let result =
            ExecutionResult::new(200, HeaderMap::new(), br#"{"ok":true}"#, Duration::ZERO).unwrap();
        assert_eq!(result.body, ResponseBody::Json(json!({"ok": true})));
        assert_eq!(result.size_bytes, 11);
        assert_eq!(result.status_text, "OK");
    }

    #[test]
    fn test_non_json_body_kept_raw() {
        let result = ExecutionResult::new(
            500,
            HeaderMap::new(),
            b"<html>oops</html>",
            Duration::from_millis(12),
        )
        .unwrap();
        assert_eq!(result.body, ResponseBody::Raw("<html>oops</html>".to_string()));
        assert!(result.is_server_error());
        assert_eq!(result.timing_ms(), 12);
    }

    #[test]
    fn test_empty_body_is_raw() {
        let result = ExecutionResult::new(204, HeaderMap::new(), b"", Duration::ZERO).unwrap();
        assert_eq!(result.body, ResponseBody::Raw(String::new()));
        assert_eq!(result.size_bytes, 0);
    }

    #[test]
    fn test_size_counts_raw_bytes() {
        let raw = "héllo".as_bytes();
        let result = ExecutionResult::new(200, HeaderMap::new(), raw, Duration::ZERO).unwrap();
        assert_eq!(result.size_bytes, 6);
    }

    #[test]
    fn test_untagged_serialization() {
        let json_body = ResponseBody::Json(json!({"id": 1}));
        assert_eq!(serde_json::to_value(&json_body).unwrap(), json!({"id": 1}));

        let raw = ResponseBody::Raw("plain".to_string());
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!("plain"));

        let back: ResponseBody = serde_json::from_value(json!([1, 2])).unwrap();
        assert!(back.is_json());
        let back: ResponseBody = serde_json::from_value(json!("plain")).unwrap();
        assert_eq!(back, raw);
    }
}
