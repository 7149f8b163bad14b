use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::Result;
use crate::config::HistorySettings;
use crate::history::model::{HistoryRecord, RequestSnapshot, ResponseSnapshot};
use crate::history::storage::HistoryStorage;
use crate::http::{ExecutionResult, NormalizedRequest};
use crate::identity::OwnerId;

/// 分页元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_requests: usize,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub pagination: Pagination,
}

/// 历史记录器
///
/// 所有操作都以 `OwnerId` 为作用域；文件 IO 在阻塞线程池上执行。
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    storage: Arc<HistoryStorage>,
    default_page_size: usize,
    max_page_size: usize,
}

impl HistoryRecorder {
    pub fn new(storage: HistoryStorage, settings: &HistorySettings) -> Self {
        Self {
            storage: Arc::new(storage),
            default_page_size: settings.default_page_size.max(1),
            max_page_size: settings.max_page_size.max(1),
        }
    }

    pub fn from_settings(settings: &HistorySettings) -> Self {
        Self::new(HistoryStorage::new(settings), settings)
    }

    pub fn storage(&self) -> &HistoryStorage {
        &self.storage
    }

    /// 持久化一次已完成的执行
    ///
    /// 只接受完整的 `ExecutionResult`；传输失败的请求不会走到这里。
    pub async fn record(
        &self,
        owner: &OwnerId,
        request: &NormalizedRequest,
        result: &ExecutionResult,
    ) -> Result<HistoryRecord> {
        let record = capture(owner, request, result);
        let to_write = record.clone();
        self.blocking(move |storage| storage.append(&to_write))
            .await?;
        debug!("Recorded {} for {}", record.id, owner);
        Ok(record)
    }

    /// 按时间倒序分页
    pub async fn list(
        &self,
        owner: &OwnerId,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<HistoryPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let records = self.all(owner).await?;
        Ok(paginate(records, page, limit))
    }

    /// 该用户的全部记录 (最新在前)，供统计使用
    pub async fn all(&self, owner: &OwnerId) -> Result<Vec<HistoryRecord>> {
        let owner = owner.clone();
        let mut records = self
            .blocking(move |storage| storage.list_owned(&owner))
            .await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// 按 ID 查找。属于他人的记录与不存在一样返回 `None`
    pub async fn find(&self, owner: &OwnerId, id: &str) -> Result<Option<HistoryRecord>> {
        let records = self.all(owner).await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    /// 删除单条记录。不存在与属于他人返回同样的 `false`
    pub async fn delete(&self, owner: &OwnerId, id: &str) -> Result<bool> {
        let owner = owner.clone();
        let id = id.to_string();
        self.blocking(move |storage| storage.delete_owned(&owner, &id))
            .await
    }

    /// 清空该用户的历史，返回删除条数
    pub async fn clear(&self, owner: &OwnerId) -> Result<usize> {
        let owner = owner.clone();
        self.blocking(move |storage| storage.clear_owned(&owner))
            .await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&HistoryStorage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || f(&storage)).await?
    }
}

/// 由请求与执行结果生成一条新记录
pub fn capture(owner: &OwnerId, request: &NormalizedRequest, result: &ExecutionResult) -> HistoryRecord {
    HistoryRecord {
        id: Uuid::new_v4().to_string(),
        owner_id: owner.clone(),
        endpoint: request.url.to_string(),
        method: request.method,
        timestamp: Utc::now(),
        request: RequestSnapshot {
            headers: request.headers.clone(),
            body: request.body.clone(),
        },
        response: ResponseSnapshot {
            status: result.status.code(),
            status_text: result.status_text.clone(),
            headers: result.headers.clone(),
            body: result.body.clone(),
            timing: Some(result.timing_ms()),
            size: Some(result.size_bytes),
        },
    }
}

/// 按时间倒序；时间相同时后写入的在前
fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.reverse();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// 对已排序的记录切片分页 (page 从 1 开始)
pub fn paginate(records: Vec<HistoryRecord>, page: usize, limit: usize) -> HistoryPage {
    let total = records.len();
    let total_pages = total.div_ceil(limit);
    let records = records
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();

    HistoryPage {
        records,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_requests: total,
            limit,
        },
    }
}
