//! 存储模块
//!
//! 提供逐段翻译结果的内存缓存。

pub mod cache;

pub use cache::{CacheConfig, CacheEntry, CacheStats, CachedTranslator, LocalCache};
