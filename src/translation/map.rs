//! 翻译表
//!
//! 单元索引（字符串键）到译文的映射。缺失的键表示“尚未返回”，
//! 空字符串表示“已放弃”（请求失败或原文为空）。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 单元索引到译文的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

/// 某个单元在翻译表中的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus<'a> {
    /// 尚未返回
    Pending,
    /// 已放弃（空字符串）
    GaveUp,
    Translated(&'a str),
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或覆盖一个单元的译文
    pub fn insert(&mut self, index: usize, text: impl Into<String>) {
        self.entries.insert(index.to_string(), text.into());
    }

    /// 写入终态空串，表示该单元已放弃
    pub fn give_up(&mut self, index: usize) {
        self.entries.insert(index.to_string(), String::new());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(&index.to_string()).map(String::as_str)
    }

    /// 非空译文
    pub fn translation(&self, index: usize) -> Option<&str> {
        self.get(index).filter(|text| !text.trim().is_empty())
    }

    pub fn status(&self, index: usize) -> UnitStatus<'_> {
        match self.get(index) {
            None => UnitStatus::Pending,
            Some(text) if text.trim().is_empty() => UnitStatus::GaveUp,
            Some(text) => UnitStatus::Translated(text),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 所有可解析为索引的键
    ///
    /// 外部缓存载荷可能带有非数字键，这些键在查找时永远不会命中。
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().filter_map(|key| key.parse::<usize>().ok())
    }

    /// 是否存在非数字键
    pub fn has_foreign_keys(&self) -> bool {
        self.entries.keys().any(|key| key.parse::<usize>().is_err())
    }

    /// 放弃的单元数
    pub fn gave_up_count(&self) -> usize {
        self.entries.values().filter(|text| text.trim().is_empty()).count()
    }
}

impl From<HashMap<String, String>> for TranslationMap {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(usize, String)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (index, text) in iter {
            map.insert(index, text);
        }
        map
    }
}
