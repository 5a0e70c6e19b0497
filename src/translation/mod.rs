//! 翻译模块
//!
//! 双语阅读的翻译流水线：
//! - **segment**: 把文章切成带稳定索引的内容单元
//! - **provider**: 逐段翻译接口和预翻译缓存来源
//! - **session**: 翻译动作编排（并发请求、代号、状态）
//! - **render**: 原文与译文交错渲染
//! - **storage**: 本地翻译缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use shuijiao::core::Lang;
//! use shuijiao::translation::{render, GoogleTranslateClient, NoContentCache, SegmentMode, Segmenter, TranslationSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let translator = GoogleTranslateClient::new(
//!     "https://translate.googleapis.com/translate_a/single",
//!     std::time::Duration::from_secs(15),
//! )?;
//! let session = TranslationSession::new(translator, NoContentCache);
//!
//! let units = Segmenter::new().segment("<p>你好</p>", SegmentMode::HtmlBlocks, Lang::Zh);
//! let outcome = session.start(None, &units, Lang::Zh, Lang::Vi).await.settled().await;
//! let segments = render(&units, &session.snapshot(), true);
//! # let _ = (outcome, segments);
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 错误处理模块
pub mod error;

/// 翻译表
pub mod map;

/// 外部翻译来源
pub mod provider;

/// 交错渲染
pub mod render;

/// 内容切分
pub mod segment;

/// 翻译动作编排
pub mod session;

/// 本地缓存
pub mod storage;

pub use config::{constants, ConfigManager, TranslationConfig};
pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};
pub use map::{TranslationMap, UnitStatus};
pub use provider::{
    ContentCacheClient, GoogleTranslateClient, NoContentCache, TranslationCacheSource,
    UnitTranslator,
};
pub use render::{render, render_article, segments_to_html, HeaderSlot, RenderSegment, RenderedArticle};
pub use segment::{Article, ContentKind, ContentUnit, SegmentMode, Segmenter};
pub use session::{ActionHandle, ActionOutcome, TranslationSession, TranslationState};
pub use storage::{CacheConfig, CacheEntry, CacheStats, CachedTranslator, LocalCache};

use crate::core::Lang;

/// 默认翻译会话：带本地缓存的 Google 翻译，可选预翻译缓存服务
pub type DefaultSession = TranslationSession<CachedTranslator<GoogleTranslateClient>, Option<ContentCacheClient>>;

/// 一次完整翻译的结果
#[derive(Debug, Clone)]
pub struct ArticleTranslation {
    pub units: Vec<ContentUnit>,
    pub translations: TranslationMap,
    pub outcome: ActionOutcome,
}

impl ArticleTranslation {
    /// 按文章布局渲染
    pub fn render(&self, show_translation: bool) -> RenderedArticle {
        render_article(&self.units, &self.translations, show_translation)
    }
}

/// 按配置创建默认会话
pub fn default_session(config: &TranslationConfig) -> TranslationResult<DefaultSession> {
    let translator = CachedTranslator::new(
        GoogleTranslateClient::from_config(config)?,
        &CacheConfig::from(config),
    );
    let cache = ContentCacheClient::from_config(config)?;
    Ok(TranslationSession::new(translator, cache))
}

/// 翻译整篇文章并等待所有单元结束
///
/// 单元级失败不会返回错误，只在结果的 `outcome` 中计数。
pub async fn translate_article<T, C>(
    session: &TranslationSession<T, C>,
    article: &Article,
    target: Lang,
) -> ArticleTranslation
where
    T: UnitTranslator,
    C: TranslationCacheSource,
{
    let (units, handle) = session.start_article(article, target).await;
    let outcome = handle.settled().await;

    ArticleTranslation {
        translations: session.snapshot(),
        units,
        outcome,
    }
}
