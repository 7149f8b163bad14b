use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PostbenchError, Result};

/// 单个请求头 (保留原始大小写)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 有序请求头列表
///
/// 键允许重复。发送时按顺序逐个 append，持久化时原样保存；
/// 需要映射视图时使用 [`HeaderList::to_map`]，后出现的同名键覆盖先出现的。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderList(Vec<HeaderPair>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(HeaderPair::new(key, value));
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.push(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderPair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 大小写不敏感地判断是否存在某个请求头
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|h| h.key.eq_ignore_ascii_case(name))
    }

    /// 大小写不敏感地取最后一次出现的值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|h| h.key.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// 按顺序折叠为映射，后出现的同名键 (忽略大小写) 覆盖先出现的
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for h in &self.0 {
            map.retain(|k: &String, _| !k.eq_ignore_ascii_case(&h.key));
            map.insert(h.key.clone(), h.value.clone());
        }
        map
    }

    /// 转换为可发送的 HeaderMap，保留重复项
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.0.len());
        for h in &self.0 {
            let name = HeaderName::from_bytes(h.key.as_bytes())
                .map_err(|_| PostbenchError::InvalidHeader(format!("非法的名称 '{}'", h.key)))?;
            let value = HeaderValue::from_str(&h.value).map_err(|_| {
                PostbenchError::InvalidHeader(format!("'{}' 的值包含非法字符", h.key))
            })?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| HeaderPair::new(k, v))
                .collect(),
        )
    }
}

impl IntoIterator for HeaderList {
    type Item = HeaderPair;
    type IntoIter = std::vec::IntoIter<HeaderPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 客户端提交的请求头：`[{key, value}]` 列表或 `{"Key": "value"}` 对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HeaderInput {
    List(Vec<HeaderPair>),
    Map(serde_json::Map<String, Value>),
}

impl Default for HeaderInput {
    fn default() -> Self {
        HeaderInput::List(Vec::new())
    }
}

impl From<HeaderInput> for HeaderList {
    fn from(input: HeaderInput) -> Self {
        match input {
            HeaderInput::List(pairs) => HeaderList(pairs),
            HeaderInput::Map(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, value)
                })
                .collect(),
        }
    }
}

impl From<HeaderList> for HeaderInput {
    fn from(list: HeaderList) -> Self {
        HeaderInput::List(list.0)
    }
}
