use url::{Host, Url};

use crate::config::ExecutorSettings;
use crate::http::headers::HeaderList;
use crate::http::request::{NormalizedRequest, RequestDescriptor};
use crate::http::types::Method;
use crate::{PostbenchError, Result};

const CONTENT_TYPE: &str = "Content-Type";
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// 请求规范化器
///
/// 所有校验都在这里完成，失败的请求不会到达执行器。
#[derive(Debug, Clone)]
pub struct Normalizer {
    max_body_bytes: usize,
    block_private_targets: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&ExecutorSettings::default())
    }
}

impl Normalizer {
    pub fn new(settings: &ExecutorSettings) -> Self {
        Self {
            max_body_bytes: settings.max_body_bytes,
            block_private_targets: settings.block_private_targets,
        }
    }

    pub fn normalize(&self, descriptor: RequestDescriptor) -> Result<NormalizedRequest> {
        let method = Method::parse(&descriptor.method)?;
        let url = self.parse_url(&descriptor.url)?;

        let mut headers = HeaderList::new();
        for pair in HeaderList::from(descriptor.headers) {
            let key = pair.key.trim();
            if key.is_empty() {
                return Err(PostbenchError::InvalidHeader(
                    "请求头名称不能为空".to_string(),
                ));
            }
            headers.push(key, pair.value.trim());
        }

        if method.allows_body() && !headers.contains(CONTENT_TYPE) {
            headers.push(CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        }
        let wire_headers = headers.to_header_map()?;

        let body = if method.allows_body() {
            descriptor.body.filter(|b| !b.is_empty())
        } else {
            if descriptor.body.as_deref().is_some_and(|b| !b.is_empty()) {
                tracing::debug!("Dropping body supplied with GET {}", url);
            }
            None
        };

        if let Some(body) = &body
            && body.len() > self.max_body_bytes
        {
            return Err(PostbenchError::BodyTooLarge {
                size: body.len(),
                limit: self.max_body_bytes,
            });
        }

        Ok(NormalizedRequest {
            method,
            url,
            headers,
            wire_headers,
            body,
        })
    }

    fn parse_url(&self, raw: &str) -> Result<Url> {
        let input = raw.trim();
        let url = Url::parse(input)
            .map_err(|e| PostbenchError::InvalidUrl(format!("'{}' ({})", input, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PostbenchError::InvalidUrl(format!(
                "'{}' (仅支持 http/https)",
                input
            )));
        }
        let Some(host) = url.host() else {
            return Err(PostbenchError::InvalidUrl(format!("'{}' (缺少主机名)", input)));
        };

        if self.block_private_targets && is_private_host(&host) {
            return Err(PostbenchError::ForbiddenTarget(host.to_string()));
        }
        Ok(url)
    }
}

/// 仅检查字面量主机名，不做 DNS 解析
fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => {
            ip.is_loopback()
                || ip.is_private()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast()
        }
        Host::Ipv6(ip) => {
            let first = ip.segments()[0];
            ip.is_loopback()
                || ip.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link local
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || ip
                    .to_ipv4_mapped()
                    .is_some_and(|v4| is_private_host(&Host::Ipv4(v4)))
        }
    }
}
