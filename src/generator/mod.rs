//! 请求代码片段生成
//!
//! 把一次执行过的请求 (历史记录或规范化后的请求) 渲染为可以直接复制使用的
//! `fetch(...)`、curl 命令或 `.http` 文件片段。

pub mod curl;
pub mod fetch;
pub mod http;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;
use crate::http::{HeaderList, Method, NormalizedRequest};
use crate::{PostbenchError, Result};

pub use http::HttpGenerator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetFormat {
    #[default]
    Fetch,
    Curl,
    Http,
}

impl FromStr for SnippetFormat {
    type Err = PostbenchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fetch" | "js" => Ok(SnippetFormat::Fetch),
            "curl" => Ok(SnippetFormat::Curl),
            "http" => Ok(SnippetFormat::Http),
            _ => Err(PostbenchError::Other(format!(
                "未知的代码片段格式: {} (可选 fetch、curl、http)",
                s
            ))),
        }
    }
}

impl fmt::Display for SnippetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SnippetFormat::Fetch => "fetch",
            SnippetFormat::Curl => "curl",
            SnippetFormat::Http => "http",
        })
    }
}

/// 生成片段所需的请求视图
#[derive(Debug, Clone, Copy)]
pub struct SnippetRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a HeaderList,
    pub body: Option<&'a str>,
}

impl<'a> From<&'a HistoryRecord> for SnippetRequest<'a> {
    fn from(record: &'a HistoryRecord) -> Self {
        Self {
            method: record.method,
            url: &record.endpoint,
            headers: &record.request.headers,
            body: record.request.body.as_deref(),
        }
    }
}

impl<'a> From<&'a NormalizedRequest> for SnippetRequest<'a> {
    fn from(request: &'a NormalizedRequest) -> Self {
        Self {
            method: request.method,
            url: request.url.as_str(),
            headers: &request.headers,
            body: request.body.as_deref(),
        }
    }
}

impl<'a> SnippetRequest<'a> {
    /// 去掉传输层自动生成的请求头，同名键后出现的覆盖先出现的 (忽略大小写)
    fn visible_headers(&self) -> Vec<(&'a str, &'a str)> {
        let mut headers: Vec<(&str, &str)> = Vec::new();
        for h in self.headers.iter() {
            if should_skip_header(&h.key) {
                continue;
            }
            match headers
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(&h.key))
            {
                Some(existing) => existing.1 = &h.value,
                None => headers.push((&h.key, &h.value)),
            }
        }
        headers
    }

    fn body(&self) -> Option<&'a str> {
        self.body
            .filter(|b| self.method.allows_body() && !b.trim().is_empty())
    }
}

/// 渲染单个请求
pub fn render(format: SnippetFormat, request: SnippetRequest<'_>) -> String {
    match format {
        SnippetFormat::Fetch => fetch::render(&request),
        SnippetFormat::Curl => curl::render(&request),
        SnippetFormat::Http => http::render(&request),
    }
}

/// 批量导出历史记录
pub fn generate(format: SnippetFormat, records: &[HistoryRecord]) -> Result<String> {
    if format == SnippetFormat::Http {
        return HttpGenerator::generate(records);
    }

    let mut output = records
        .iter()
        .map(|r| render(format, r.into()))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

fn should_skip_header(name: &str) -> bool {
    let name_lower = name.to_lowercase();
    matches!(
        name_lower.as_str(),
        "content-length" | "host" | "connection" | "accept-encoding" | "user-agent"
    )
}

/// 能解析为 JSON 的请求体返回美化后的文本
fn pretty_json(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .map(|value| format!("{:#}", value))
}
