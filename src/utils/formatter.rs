use crate::http::ExecutionResult;
use colored::*;

const COMPACT_BODY_LIMIT: usize = 200;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

/// 终端输出用的响应格式化
pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
    show_body: bool,
    show_headers: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
            show_body: true,
            show_headers: true,
            show_timing: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format(&self, result: &ExecutionResult) -> String {
        let mut output = vec![self.status_line(result)];

        if self.show_timing {
            output.push(self.paint(
                format!("Time: {}ms  Size: {} bytes", result.timing_ms(), result.size_bytes),
                |s| s.cyan(),
            ));
        }

        match self.format {
            ResponseFormat::Compact => self.push_compact_body(result, &mut output),
            ResponseFormat::Verbose => {
                if self.show_headers {
                    output.push(String::new());
                    output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
                    for (key, value) in result.headers.iter() {
                        let value_str = value.to_str().unwrap_or("<invalid utf-8>");
                        output.push(self.paint(format!("   {}: {}", key, value_str), |s| s.blue()));
                    }
                }
                if self.show_body && result.size_bytes > 0 {
                    output.push(String::new());
                    output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
                    output.push(result.body.to_display_string());
                }
            }
        }

        output.join("\n")
    }

    fn status_line(&self, result: &ExecutionResult) -> String {
        let status_line = format!("HTTP {} {}", result.status.code(), result.status_text);
        if !self.color {
            return status_line;
        }
        let colored = if result.is_success() {
            status_line.green()
        } else if result.is_client_error() {
            status_line.yellow()
        } else {
            status_line.red()
        };
        colored.bold().to_string()
    }

    fn push_compact_body(&self, result: &ExecutionResult, output: &mut Vec<String>) {
        if !self.show_body || result.size_bytes == 0 {
            return;
        }
        let body = result.body.to_display_string();
        if body.len() < COMPACT_BODY_LIMIT {
            output.push(body);
        } else {
            output.push(format!("Body: {} bytes", result.size_bytes));
        }
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(&text).to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use std::time::Duration;

    fn result(status: u16, body: &[u8]) -> ExecutionResult {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        ExecutionResult::new(status, headers, body, Duration::from_millis(7)).unwrap()
    }

    #[test]
    fn test_compact_plain() {
        let text = ResponseFormatter::new(ResponseFormat::Compact)
            .without_color()
            .format(&result(404, br#"{"error":"missing"}"#));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "HTTP 404 Not Found");
        assert_eq!(lines[1], "Time: 7ms  Size: 19 bytes");
        assert!(text.contains("\"error\": \"missing\""));
        assert!(!text.contains("Headers:"));
    }

    #[test]
    fn test_compact_large_body_summarized() {
        let big = vec![b'x'; 500];
        let text = ResponseFormatter::new(ResponseFormat::Compact)
            .without_color()
            .format(&result(200, &big));
        assert!(text.ends_with("Body: 500 bytes"));
    }

    #[test]
    fn test_verbose_includes_headers_and_body() {
        let text = ResponseFormatter::new(ResponseFormat::Verbose)
            .without_color()
            .format(&result(200, b"plain text"));
        assert!(text.contains("Headers:"));
        assert!(text.contains("   content-type: application/json"));
        assert!(text.contains("Body:\nplain text"));
    }
}
