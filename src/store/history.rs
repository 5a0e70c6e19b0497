//! 查词历史
//!
//! 显式打开、显式写回的历史记录，最近查询的在最前。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ShuijiaoResult;

/// 最多保留的记录数
pub const MAX_HISTORY_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub word: String,
    pub looked_up_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// 加载历史文件；文件不存在时为空
    pub fn open(path: impl Into<PathBuf>) -> ShuijiaoResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("加载查词历史 {} 条: {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 记录一次查询并立即写回
    ///
    /// 已有的同一个词移到最前；超出上限时丢弃最旧的记录。
    pub fn record(&mut self, word: &str) -> ShuijiaoResult<()> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(());
        }

        self.entries.retain(|entry| entry.word != word);
        self.entries.insert(
            0,
            HistoryEntry {
                word: word.to_string(),
                looked_up_at: Utc::now(),
            },
        );
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist()
    }

    pub fn clear(&mut self) -> ShuijiaoResult<()> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> ShuijiaoResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
