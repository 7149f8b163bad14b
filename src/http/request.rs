use reqwest::header::HeaderMap;
use serde::Deserialize;
use url::Url;

use crate::http::headers::{HeaderInput, HeaderList};
use crate::http::types::Method;
use crate::utils::serialization;

/// 客户端提交的原始请求描述，尚未校验
#[derive(Debug, Clone, Deserialize)]
pub struct RequestDescriptor {
    // 缺失时按空串处理，交给 Normalizer 报校验错误
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub headers: HeaderInput,
    #[serde(default, deserialize_with = "serialization::body_text::deserialize")]
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            headers: HeaderInput::default(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        let mut list = HeaderList::from(self.headers);
        list.push(key, value);
        self.headers = list.into();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    pub fn with_auth_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }
}

/// 经过规范化、可以直接发送的请求
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub method: Method,
    pub url: Url,
    /// 原始顺序的请求头 (含自动注入的 Content-Type)，用于持久化
    pub headers: HeaderList,
    /// 发送用的请求头，与 `headers` 顺序一致
    pub wire_headers: HeaderMap,
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_ui_payload() {
        let descriptor: RequestDescriptor = serde_json::from_str(
            r#"{
                "url": "https://api.example.com/users",
                "method": "POST",
                "headers": [{"key": "X-Api-Key", "value": "abc"}],
                "body": "{\"name\":\"foo\"}"
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.method, "POST");
        assert_eq!(descriptor.body.as_deref(), Some(r#"{"name":"foo"}"#));
        let headers = HeaderList::from(descriptor.headers);
        assert_eq!(headers.get("x-api-key"), Some("abc"));
    }

    #[test]
    fn test_deserialize_null_body_and_missing_headers() {
        let descriptor: RequestDescriptor =
            serde_json::from_str(r#"{"url": "https://a.example", "method": "GET", "body": null}"#)
                .unwrap();
        assert!(descriptor.body.is_none());
        assert!(HeaderList::from(descriptor.headers).is_empty());
    }

    #[test]
    fn test_object_body_is_kept_as_text() {
        let descriptor: RequestDescriptor = serde_json::from_str(
            r#"{"url": "https://a.example", "method": "PUT", "body": {"id": 1}}"#,
        )
        .unwrap();
        assert_eq!(descriptor.body.as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn test_builder_appends_headers_in_order() {
        let descriptor = RequestDescriptor::new("GET", "https://a.example")
            .with_header("Accept", "*/*")
            .with_auth_bearer("tok");
        let headers = HeaderList::from(descriptor.headers);
        let keys: Vec<_> = headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["Accept", "Authorization"]);
        assert_eq!(headers.get("authorization"), Some("Bearer tok"));
    }
}
