//! 本地持久化数据

pub mod history;

pub use history::{HistoryEntry, HistoryStore, MAX_HISTORY_ENTRIES};
