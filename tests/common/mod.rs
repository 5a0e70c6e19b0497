// 集成测试公共模块
//
// 提供模拟翻译来源和测试数据

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use shuijiao::core::Lang;
use shuijiao::translation::{
    Article, TranslationCacheSource, TranslationError, TranslationMap, TranslationResult,
    UnitTranslator,
};

/// 模拟逐段翻译：返回 `"[vi] " + 原文`
///
/// 可以让指定原文失败或延迟返回，并记录调用次数。
#[derive(Debug, Clone, Default)]
pub struct MockTranslator {
    failures: Arc<HashSet<String>>,
    delays: Arc<HashMap<String, Duration>>,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        let mut failures = (*self.failures).clone();
        failures.insert(text.to_string());
        self.failures = Arc::new(failures);
        self
    }

    pub fn delayed(mut self, text: &str, delay: Duration) -> Self {
        let mut delays = (*self.delays).clone();
        delays.insert(text.to_string(), delay);
        self.delays = Arc::new(delays);
        self
    }

    /// 所有请求都失败
    pub fn always_failing(texts: &[&str]) -> Self {
        texts.iter().fold(Self::new(), |mock, text| mock.failing_on(text))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn expected(text: &str) -> String {
        format!("[vi] {}", text)
    }
}

impl UnitTranslator for MockTranslator {
    async fn translate(&self, text: &str, _source: Lang, _target: Lang) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }

        if self.failures.contains(text) {
            return Err(TranslationError::NetworkError(format!("mock failure: {}", text)));
        }

        Ok(Self::expected(text))
    }
}

/// 模拟预翻译缓存
#[derive(Debug, Clone, Default)]
pub struct MockCache {
    payloads: Arc<HashMap<String, TranslationMap>>,
    broken: bool,
    lookups: Arc<AtomicUsize>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, content_id: &str, payload: TranslationMap) -> Self {
        let mut payloads = (*self.payloads).clone();
        payloads.insert(content_id.to_string(), payload);
        self.payloads = Arc::new(payloads);
        self
    }

    /// 每次查询都返回错误
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TranslationCacheSource for MockCache {
    async fn lookup(&self, content_id: &str, _target: Lang) -> TranslationResult<Option<TranslationMap>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(TranslationError::CacheError("mock cache unavailable".to_string()));
        }
        Ok(self.payloads.get(content_id).cloned())
    }
}

/// 测试文章
pub struct ArticleFixtures;

impl ArticleFixtures {
    pub fn news() -> Article {
        Article {
            id: "news-42".to_string(),
            title: "北京今天下雪了".to_string(),
            description: "气象台发布消息".to_string(),
            body_html: "<p>第一段。</p><p>第二段。</p><p>第三段。</p>".to_string(),
            lang: Lang::Zh,
        }
    }

    pub fn untitled_body(body_html: &str) -> Article {
        Article {
            id: String::new(),
            body_html: body_html.to_string(),
            lang: Lang::Zh,
            ..Article::default()
        }
    }

    pub fn map(entries: &[(usize, &str)]) -> TranslationMap {
        entries
            .iter()
            .map(|(index, text)| (*index, text.to_string()))
            .collect()
    }
}

/// 性能测试工具
pub struct PerformanceHelper;

impl PerformanceHelper {
    pub async fn measure_async_time<F, Fut, R>(f: F) -> (R, Duration)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let start = Instant::now();
        let result = f().await;
        (result, start.elapsed())
    }
}
