use super::{SnippetRequest, pretty_json};
use crate::Result;
use crate::history::HistoryRecord;

/// `.http` 文件格式 (REST Client 兼容)
pub struct HttpGenerator;

impl HttpGenerator {
    /// 把历史记录导出为 `.http` 文件内容，请求块之间空一行
    pub fn generate(records: &[HistoryRecord]) -> Result<String> {
        let mut output = String::new();

        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                output.push_str("\n\n");
            }
            output.push_str(&Self::format_record(record));
        }

        if !records.is_empty() {
            output.push('\n');
        }

        Ok(output)
    }

    fn format_record(record: &HistoryRecord) -> String {
        let mut block = format!("### Request {}\n", record.short_id());
        block.push_str(&format!(
            "# @name req_{}\n",
            record.timestamp.format("%Y%m%d%H%M%S")
        ));
        block.push_str(&render(&record.into()));

        // 记录当时的响应状态
        block.push_str(&format!(
            "\n# @assert status == {}\n",
            record.response.status
        ));
        block
    }
}

/// 单个请求块: 请求行、请求头、空行后的请求体
pub fn render(request: &SnippetRequest<'_>) -> String {
    let mut block = format!("{} {}\n", request.method, request.url);

    for (key, value) in request.visible_headers() {
        block.push_str(&format!("{}: {}\n", key, value));
    }

    if let Some(body) = request.body() {
        block.push('\n');
        match pretty_json(body) {
            Some(pretty) => block.push_str(&pretty),
            None => block.push_str(body),
        }
        block.push('\n');
    }

    block
}
