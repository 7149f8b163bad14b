use super::model::HistoryRecord;
use crate::Result;
use crate::config::HistorySettings;
use crate::identity::OwnerId;
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// 20 MB soft limit for compaction
const COMPACTION_THRESHOLD_BYTES: u64 = 20 * 1024 * 1024;
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// JSON Lines 历史存储
///
/// 所有用户共享一个文件，每行一条记录，按写入顺序排列 (旧 -> 新)。
#[derive(Debug, Clone)]
pub struct HistoryStorage {
    file_path: PathBuf,
    max_entries: usize,
    compaction_threshold: u64,
}

impl HistoryStorage {
    pub fn new(settings: &HistorySettings) -> Self {
        Self {
            file_path: settings.file_path(),
            max_entries: settings.max_entries,
            compaction_threshold: COMPACTION_THRESHOLD_BYTES,
        }
    }

    /// Create with specific path (internal/testing use)
    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            file_path: path,
            max_entries: DEFAULT_MAX_ENTRIES,
            compaction_threshold: COMPACTION_THRESHOLD_BYTES,
        }
    }

    pub fn with_compaction(mut self, threshold_bytes: u64, max_entries: usize) -> Self {
        self.compaction_threshold = threshold_bytes;
        self.max_entries = max_entries;
        self
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Ensure directory exists
    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a new record to history
    ///
    /// # Concurrency Strategy
    /// Uses `fs2::lock_exclusive` so a line is never interleaved with another
    /// writer or observed half-written by a reader. Rewrites (delete, clear,
    /// compaction) take the same lock, so an append waits for them to finish.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.lock_exclusive()?;
        writeln!(file, "{}", json)?;
        file.flush()?;

        // Unlock happens when file is dropped
        drop(file);

        Ok(())
    }

    /// All records of one owner, oldest first (possibly compacting first)
    pub fn list_owned(&self, owner: &OwnerId) -> Result<Vec<HistoryRecord>> {
        let mut records = self.list()?;
        records.retain(|r| r.is_owned_by(owner));
        Ok(records)
    }

    /// All records, oldest first
    pub fn list(&self) -> Result<Vec<HistoryRecord>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        // Lazy Compaction: Check size on Read, not on Write.
        // This keeps the "hot path" (append) fast and robust.
        self.compact_if_needed()?;

        self.read_all()
    }

    /// 删除 `owner` 名下 id 为 `id` 的记录，返回是否删除
    pub fn delete_owned(&self, owner: &OwnerId, id: &str) -> Result<bool> {
        let removed = self.rewrite(|records| {
            records
                .into_iter()
                .filter(|r| !(r.id == id && r.is_owned_by(owner)))
                .collect()
        })?;
        Ok(removed > 0)
    }

    /// 删除 `owner` 的全部记录，返回删除条数
    pub fn clear_owned(&self, owner: &OwnerId) -> Result<usize> {
        self.rewrite(|records| records.into_iter().filter(|r| !r.is_owned_by(owner)).collect())
    }

    fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        // Shared lock so we never read a line that a writer is still producing
        let file = File::open(&self.file_path)?;
        file.lock_shared()?;
        let records = Self::read_records(&file)?;
        // Unlock on drop
        Ok(records)
    }

    fn read_records(file: &File) -> Result<Vec<HistoryRecord>> {
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping unreadable history line: {}", e),
            }
        }
        Ok(records)
    }

    /// Read-filter-truncate-rewrite under an exclusive lock.
    ///
    /// We truncate the same handle instead of renaming a temp file so the lock
    /// stays valid for the whole critical section (rename breaks it on Windows).
    /// Returns how many records were dropped.
    fn rewrite<F>(&self, select: F) -> Result<usize>
    where
        F: FnOnce(Vec<HistoryRecord>) -> Vec<HistoryRecord>,
    {
        if !self.file_path.exists() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.file_path)?;
        file.lock_exclusive()?;

        let records = Self::read_records(&file)?;
        let before = records.len();
        let kept = select(records);
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;

        let mut writer = BufWriter::new(&file);
        for record in &kept {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(removed)
    }

    /// Check file size and prune the oldest records if needed
    fn compact_if_needed(&self) -> Result<()> {
        // Check metadata first to avoid locking on every read
        let size = fs::metadata(&self.file_path)?.len();
        if size < self.compaction_threshold {
            return Ok(());
        }

        let max_entries = self.max_entries;
        let removed = self.rewrite(|records| retain_newest_per_owner(records, max_entries))?;

        if removed > 0 {
            info!("Compacted history: dropped {} oldest records", removed);
        }
        Ok(())
    }
}

/// 每个用户只保留最新的 `max_entries` 条，其他用户的记录互不影响
fn retain_newest_per_owner(records: Vec<HistoryRecord>, max_entries: usize) -> Vec<HistoryRecord> {
    let mut seen: HashMap<OwnerId, usize> = HashMap::new();
    let mut kept: Vec<HistoryRecord> = records
        .into_iter()
        .rev()
        .filter(|r| {
            let count = seen.entry(r.owner_id.clone()).or_default();
            *count += 1;
            *count <= max_entries
        })
        .collect();
    kept.reverse();
    kept
}
