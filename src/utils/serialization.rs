use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// HeaderMap <-> `{"name": "value"}`
///
/// 同名的多个值以 ", " 拼接；非 UTF-8 的值按有损方式转换。
pub mod header_map {
    use super::*;

    pub fn to_object(headers: &HeaderMap) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in headers.iter() {
            let value = String::from_utf8_lossy(v.as_bytes()).into_owned();
            map.entry(k.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        map
    }

    pub fn serialize<S>(headers: &HeaderMap, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        to_object(headers).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
        let mut headers = HeaderMap::new();
        for (k, v) in map {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(&v),
            ) {
                headers.insert(name, value);
            }
        }
        Ok(headers)
    }
}

/// 请求体：JSON 字符串原样保留，null 视为无，其他 JSON 值序列化为紧凑文本
pub mod body_text {
    use super::*;
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "header_map")]
        headers: HeaderMap,
    }

    #[test]
    fn test_repeated_values_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("content-type", HeaderValue::from_static("text/html"));

        let json = serde_json::to_value(Wrapper { headers }).unwrap();
        assert_eq!(json["headers"]["set-cookie"], "a=1, b=2");
        assert_eq!(json["headers"]["content-type"], "text/html");
    }

    #[test]
    fn test_deserialize_skips_invalid_entries() {
        let wrapper: Wrapper =
            serde_json::from_str(r#"{"headers": {"x-ok": "1", "bad name": "2"}}"#).unwrap();
        assert_eq!(wrapper.headers.len(), 1);
        assert_eq!(wrapper.headers["x-ok"], "1");
    }
}
