use serde_json::{Map, Value};

use super::{SnippetRequest, pretty_json};

/// JavaScript `fetch(...)` 调用
pub fn render(request: &SnippetRequest<'_>) -> String {
    let headers: Map<String, Value> = request
        .visible_headers()
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let mut code = format!(
        "fetch({}, {{\n  method: \"{}\",\n  headers: {},\n",
        Value::String(request.url.to_string()),
        request.method,
        indent(&format!("{:#}", Value::Object(headers)))
    );

    if let Some(body) = request.body() {
        let body = match pretty_json(body) {
            Some(json) => format!("JSON.stringify({})", json),
            None => Value::String(body.to_string()).to_string(),
        };
        code.push_str(&format!("  body: {},\n", indent(&body)));
    }

    code.push_str(
        "})\n  .then(res => res.json())\n  .then(data => console.log(data))\n  .catch(err => console.error(err));",
    );
    code
}

fn indent(text: &str) -> String {
    text.replace('\n', "\n  ")
}
