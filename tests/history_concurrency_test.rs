use chrono::Utc;
use postbench::OwnerId;
use postbench::history::storage::HistoryStorage;
use postbench::history::{HistoryRecord, RequestSnapshot, ResponseSnapshot};
use postbench::http::{HeaderList, Method, ResponseBody};
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn create_dummy_record(id: String, owner: &str) -> HistoryRecord {
    HistoryRecord {
        id,
        owner_id: OwnerId::from(owner),
        endpoint: "https://example.com/".to_string(),
        method: Method::Get,
        timestamp: Utc::now(),
        request: RequestSnapshot {
            headers: HeaderList::new(),
            body: None,
        },
        response: ResponseSnapshot {
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            body: ResponseBody::Json(serde_json::json!({"ok": true})),
            timing: Some(100),
            size: Some(11),
        },
    }
}

#[test]
fn test_concurrent_writes() {
    let temp_dir = TempDir::new().unwrap();
    let history_file = temp_dir.path().join("history.jsonl");
    let history_path = Arc::new(history_file.clone());

    let mut handles = vec![];
    let thread_count = 10;
    let records_per_thread = 50;

    for i in 0..thread_count {
        let path = history_path.clone();
        handles.push(thread::spawn(move || {
            // 每个线程独立的 storage，模拟多个进程
            let storage = HistoryStorage::new_with_path((*path).clone());
            let owner = if i % 2 == 0 { "alice" } else { "bob" };
            for j in 0..records_per_thread {
                let record = create_dummy_record(format!("{}-{}", i, j), owner);
                storage.append(&record).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let storage = HistoryStorage::new_with_path(history_file);
    let records = storage.list().unwrap();
    assert_eq!(records.len(), thread_count * records_per_thread);

    let ids: HashSet<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), records.len(), "Duplicate or torn records");

    let alice = storage.list_owned(&OwnerId::from("alice")).unwrap();
    assert_eq!(alice.len(), (thread_count / 2) * records_per_thread);
}

#[test]
fn test_concurrent_append_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let history_file = temp_dir.path().join("history.jsonl");

    let seed = HistoryStorage::new_with_path(history_file.clone());
    for j in 0..20 {
        seed.append(&create_dummy_record(format!("old-{}", j), "alice"))
            .unwrap();
    }

    let writer_path = history_file.clone();
    let writer = thread::spawn(move || {
        let storage = HistoryStorage::new_with_path(writer_path);
        for j in 0..100 {
            storage
                .append(&create_dummy_record(format!("bob-{}", j), "bob"))
                .unwrap();
        }
    });

    let clearer_path = history_file.clone();
    let clearer = thread::spawn(move || {
        let storage = HistoryStorage::new_with_path(clearer_path);
        storage.clear_owned(&OwnerId::from("alice")).unwrap()
    });

    writer.join().unwrap();
    let cleared = clearer.join().unwrap();
    assert_eq!(cleared, 20);

    // 清空 alice 不能丢掉 bob 并发写入的任何一条
    let storage = HistoryStorage::new_with_path(history_file);
    assert!(storage.list_owned(&OwnerId::from("alice")).unwrap().is_empty());
    assert_eq!(storage.list_owned(&OwnerId::from("bob")).unwrap().len(), 100);
}
