//! 翻译缓存模块
//!
//! 本地 LRU 缓存，键为 (原文, 源语言, 目标语言) 的 blake3 摘要。
//! [`CachedTranslator`] 把它套在任意逐段翻译接口外面。

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use blake3::Hasher;
use lru::LruCache;

use crate::core::Lang;
use crate::translation::config::{constants, TranslationConfig};
use crate::translation::error::TranslationResult;
use crate::translation::provider::UnitTranslator;

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub translated_text: String,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn new(translated_text: String) -> Self {
        Self {
            translated_text,
            created_at: Instant::now(),
        }
    }

    /// 检查条目是否过期
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    /// 生成缓存键
    pub fn generate_key(text: &str, source: Lang, target: Lang) -> String {
        let mut hasher = Hasher::new();
        hasher.update(text.as_bytes());
        hasher.update(&[0]);
        hasher.update(source.code().as_bytes());
        hasher.update(&[0]);
        hasher.update(target.code().as_bytes());
        format!("trans:{}", hasher.finalize().to_hex())
    }
}

/// 缓存配置
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: constants::DEFAULT_LOCAL_CACHE_SIZE,
            ttl: constants::DEFAULT_CACHE_TTL,
        }
    }
}

impl From<&TranslationConfig> for CacheConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            enabled: config.cache_enabled,
            capacity: config.local_cache_size,
            ttl: config.cache_ttl(),
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub expired_items: u64,
}

impl CacheStats {
    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 本地LRU缓存
#[derive(Debug)]
pub struct LocalCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    expired_items: AtomicU64,
}

impl LocalCache {
    /// 创建新的本地缓存
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            expired_items: AtomicU64::new(0),
        }
    }

    /// 获取缓存项
    pub fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.translated_text.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            cache.pop(key);
            self.expired_items.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// 设置缓存项
    pub fn set(&self, key: String, translated_text: String) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.put(key, CacheEntry::new(translated_text));
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// 清理过期项
    pub fn cleanup_expired(&self) -> usize {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let expired_keys: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            cache.pop(key);
        }

        self.expired_items
            .fetch_add(expired_keys.len() as u64, Ordering::Relaxed);
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            expired_items: self.expired_items.load(Ordering::Relaxed),
        }
    }
}

/// 带本地缓存的逐段翻译
///
/// 只缓存非空译文；失败不缓存，下一次翻译动作会重新请求。
#[derive(Debug)]
pub struct CachedTranslator<T> {
    inner: T,
    cache: Option<LocalCache>,
}

impl<T: UnitTranslator> CachedTranslator<T> {
    pub fn new(inner: T, config: &CacheConfig) -> Self {
        let cache = config
            .enabled
            .then(|| LocalCache::new(config.capacity, config.ttl));
        Self { inner, cache }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn cache(&self) -> Option<&LocalCache> {
        self.cache.as_ref()
    }
}

impl<T: UnitTranslator> UnitTranslator for CachedTranslator<T> {
    async fn translate(&self, text: &str, source: Lang, target: Lang) -> TranslationResult<String> {
        let Some(cache) = &self.cache else {
            return self.inner.translate(text, source, target).await;
        };

        let key = CacheEntry::generate_key(text, source, target);
        if let Some(cached) = cache.get(&key) {
            tracing::debug!("翻译缓存命中: {}", key);
            return Ok(cached);
        }

        let translated = self.inner.translate(text, source, target).await?;
        if !translated.trim().is_empty() {
            cache.set(key, translated.clone());
        }
        Ok(translated)
    }
}
