//! # Shuijiao Library
//!
//! 中文新闻双语阅读工具库：把文章切成稳定索引的内容单元，逐段并发翻译，
//! 再把译文交错插入原文。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型和语言标识
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 片段、句子切分、汉字笔画数据
//! - `translation` - 切分、翻译动作编排、交错渲染
//! - `hsk` - HSK 课程数据登记表
//! - `store` - 查词历史

pub mod core;
pub mod env;
pub mod hsk;
pub mod parsers;
pub mod store;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{Lang, ShuijiaoError, ShuijiaoResult};
pub use hsk::{HskLevel, HskRegistry, HskSource};
pub use store::HistoryStore;
pub use translation::{
    render, Article, ContentUnit, SegmentMode, Segmenter, TranslationMap, TranslationSession,
};
