use std::time::{Duration, Instant};

use reqwest::redirect::Policy;
use tracing::{debug, warn};

use crate::config::ExecutorSettings;
use crate::http::request::NormalizedRequest;
use crate::http::response::ExecutionResult;
use crate::{PostbenchError, Result};

/// 请求执行器
///
/// 每次调用只发出一次请求，不重试，也不写历史记录。
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    timeout: Duration,
}

impl Client {
    pub fn new(settings: &ExecutorSettings) -> Result<Self> {
        let redirect = if settings.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(settings.max_redirects)
        };

        let inner = reqwest::Client::builder()
            .timeout(settings.timeout())
            .redirect(redirect)
            .build()
            .map_err(|e| PostbenchError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            timeout: settings.timeout(),
        })
    }

    pub async fn execute(&self, request: &NormalizedRequest) -> Result<ExecutionResult> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request.wire_headers.clone());

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        debug!("{} {}", request.method, request.url);

        // 计时覆盖发送到完整读取响应体
        let start = Instant::now();
        let response = req.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let raw_body = response.bytes().await.map_err(|e| self.classify(e))?;
        let duration = start.elapsed();

        debug!(
            "{} {} -> {} ({} bytes, {}ms)",
            request.method,
            request.url,
            status,
            raw_body.len(),
            duration.as_millis()
        );

        ExecutionResult::new(status, headers, &raw_body, duration)
    }

    fn classify(&self, err: reqwest::Error) -> PostbenchError {
        let target = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        warn!("Request to {} failed: {}", target, err);

        if err.is_timeout() {
            PostbenchError::Timeout(format!(
                "{} 未在 {} 秒内完成",
                target,
                self.timeout.as_secs()
            ))
        } else if err.is_connect() {
            PostbenchError::NetworkError(format!("无法连接到 {}: {}", target, err))
        } else if err.is_redirect() {
            PostbenchError::NetworkError(format!("重定向次数过多: {}", target))
        } else {
            PostbenchError::NetworkError(err.to_string())
        }
    }
}
