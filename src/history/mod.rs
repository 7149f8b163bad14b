pub mod model;
pub mod printer;
pub mod recorder;
pub mod storage;

pub use model::{HistoryRecord, RequestSnapshot, ResponseSnapshot};
pub use recorder::{HistoryPage, HistoryRecorder, Pagination};
pub use storage::HistoryStorage;
