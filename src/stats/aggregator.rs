use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::history::model::HistoryRecord;
use crate::http::types::is_success_code;

/// 使用统计快照
///
/// 每次都从用户的完整历史重新计算，不存在增量计数器，因此总是与历史一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// 百分比，保留两位小数；没有记录时为 0
    pub success_rate: f64,
    pub method_breakdown: BTreeMap<String, u64>,
    pub status_breakdown: BTreeMap<String, u64>,
}

/// 汇总历史记录
pub fn summarize<'a, I>(records: I) -> StatisticsSnapshot
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let mut snapshot = StatisticsSnapshot::default();

    for record in records {
        snapshot.total_requests += 1;
        if is_success_code(record.response.status) {
            snapshot.successful_requests += 1;
        }
        *snapshot
            .method_breakdown
            .entry(record.method.as_str().to_string())
            .or_default() += 1;
        *snapshot
            .status_breakdown
            .entry(record.response.status.to_string())
            .or_default() += 1;
    }

    snapshot.failed_requests = snapshot.total_requests - snapshot.successful_requests;
    snapshot.success_rate = success_rate(snapshot.successful_requests, snapshot.total_requests);
    snapshot
}

fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = successful as f64 * 100.0 / total as f64;
    (rate * 100.0).round() / 100.0
}
