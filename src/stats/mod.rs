pub mod aggregator;
pub mod printer;

pub use aggregator::{StatisticsSnapshot, summarize};
