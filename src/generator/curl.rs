use super::SnippetRequest;
use crate::http::Method;

/// curl 命令，参数使用 POSIX shell 单引号转义
pub fn render(request: &SnippetRequest<'_>) -> String {
    let mut parts = vec![match request.method {
        Method::Get => format!("curl {}", shell_quote(request.url)),
        other => format!("curl -X {} {}", other, shell_quote(request.url)),
    }];

    for (key, value) in request.visible_headers() {
        parts.push(format!("-H {}", shell_quote(&format!("{}: {}", key, value))));
    }
    if let Some(body) = request.body() {
        parts.push(format!("-d {}", shell_quote(body)));
    }

    parts.join(" \\\n  ")
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
