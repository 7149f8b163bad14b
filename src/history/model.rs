use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::http::{HeaderList, Method, ResponseBody};
use crate::identity::OwnerId;
use crate::utils::serialization;

/// 历史记录条目
///
/// 创建后不再修改，只能整条删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// 唯一 ID (UUID)
    pub id: String,

    /// 所属用户
    pub owner_id: OwnerId,

    /// 请求的 URL
    pub endpoint: String,

    pub method: Method,

    /// 创建时间
    pub timestamp: DateTime<Utc>,

    pub request: RequestSnapshot,

    pub response: ResponseSnapshot,
}

impl HistoryRecord {
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    /// ID 的前 8 个字符，用于表格和导出
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }
}

/// 请求快照 (实际发送的请求头与请求体)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub headers: HeaderList,
    pub body: Option<String>,
}

/// 响应快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSnapshot {
    pub status: u16,

    pub status_text: String,

    #[serde(with = "serialization::header_map")]
    pub headers: HeaderMap,

    #[serde(default)]
    pub body: ResponseBody,

    /// 耗时 (毫秒)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<u64>,

    /// 响应体字节数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let record = HistoryRecord {
            id: "abc".to_string(),
            owner_id: OwnerId::from("u1"),
            endpoint: "https://api.example.com/users".to_string(),
            method: Method::Get,
            timestamp: Utc::now(),
            request: RequestSnapshot {
                headers: HeaderList::new().with("Accept", "*/*"),
                body: None,
            },
            response: ResponseSnapshot {
                status: 200,
                status_text: "OK".to_string(),
                headers: HeaderMap::new(),
                body: ResponseBody::Json(json!({"users": []})),
                timing: Some(42),
                size: Some(12),
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["ownerId"], "u1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["request"]["headers"][0]["key"], "Accept");
        assert_eq!(value["response"]["statusText"], "OK");
        assert_eq!(value["response"]["body"], json!({"users": []}));
        assert_eq!(value["response"]["timing"], 42);

        let back: HistoryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_optional_response_fields_default() {
        let line = r#"{
            "id": "1", "ownerId": "u", "endpoint": "https://a.example", "method": "DELETE",
            "timestamp": "2026-01-01T00:00:00Z",
            "request": {"headers": [], "body": null},
            "response": {"status": 204, "statusText": "No Content", "headers": {}}
        }"#;
        let record: HistoryRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.response.body, ResponseBody::Raw(String::new()));
        assert!(record.response.timing.is_none());
        assert!(record.is_owned_by(&OwnerId::from("u")));
    }

    #[test]
    fn test_short_id_counts_chars() {
        let line = r#"{
            "id": "记录-αβγδεζηθ", "ownerId": "u", "endpoint": "https://a.example", "method": "GET",
            "timestamp": "2026-01-01T00:00:00Z",
            "request": {"headers": [], "body": null},
            "response": {"status": 200, "statusText": "OK", "headers": {}}
        }"#;
        let mut record: HistoryRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.short_id(), "记录-αβγδε");

        record.id = "abc".to_string();
        assert_eq!(record.short_id(), "abc");
    }
}
