//! 外部翻译来源
//!
//! - [`UnitTranslator`]：逐段翻译接口（默认对接 Google 翻译）
//! - [`TranslationCacheSource`]：按内容 id 取预翻译结果
//!
//! 两者都可能在同一篇文章上被并发调用多次。

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::core::Lang;
use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::map::TranslationMap;

/// 逐段翻译
pub trait UnitTranslator: Send + Sync + 'static {
    fn translate(
        &self,
        text: &str,
        source: Lang,
        target: Lang,
    ) -> impl Future<Output = TranslationResult<String>> + Send;
}

/// 预翻译缓存来源
///
/// `Ok(None)` 表示没有缓存，调用方回退到逐段翻译。
pub trait TranslationCacheSource: Send + Sync + 'static {
    fn lookup(
        &self,
        content_id: &str,
        target: Lang,
    ) -> impl Future<Output = TranslationResult<Option<TranslationMap>>> + Send;
}

/// Google 翻译（`translate_a/single` 接口）
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: Client,
    api_url: String,
}

impl GoogleTranslateClient {
    pub fn new(api_url: &str, timeout: Duration) -> TranslationResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl UnitTranslator for GoogleTranslateClient {
    async fn translate(&self, text: &str, source: Lang, target: Lang) -> TranslationResult<String> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.google_code()),
                ("tl", target.google_code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ServiceError(format!(
                "HTTP {} from {}",
                status, self.api_url
            )));
        }

        let body: Value = response.json().await?;
        parse_google_response(&body)
    }
}

/// 拼接响应中每个片段的译文
///
/// 响应形如 `[[["xin chào", "你好", null, null, 1], ...], null, "zh-CN", ...]`。
pub fn parse_google_response(body: &Value) -> TranslationResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::ParseError("翻译响应缺少片段数组".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    Ok(translated)
}

/// 预翻译缓存服务：`GET {base}/{content_id}?lang={target}`
#[derive(Debug, Clone)]
pub struct ContentCacheClient {
    client: Client,
    base_url: Url,
}

impl ContentCacheClient {
    pub fn new(base_url: &str, timeout: Duration) -> TranslationResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TranslationError::ConfigError(format!("缓存地址无效 '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TranslationError::ConfigError(format!(
                "缓存地址不能作为基础路径: {}",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// 根据配置创建；未配置缓存地址时返回 `None`
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Option<Self>> {
        config
            .content_cache_url
            .as_deref()
            .map(|url| Self::new(url, config.request_timeout()))
            .transpose()
    }

    fn lookup_url(&self, content_id: &str, target: Lang) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(content_id);
        }
        url.query_pairs_mut().append_pair("lang", target.code());
        url
    }
}

impl TranslationCacheSource for ContentCacheClient {
    async fn lookup(&self, content_id: &str, target: Lang) -> TranslationResult<Option<TranslationMap>> {
        let url = self.lookup_url(content_id, target);
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
            status if !status.is_success() => {
                return Err(TranslationError::CacheError(format!("缓存服务返回 HTTP {}", status)))
            }
            _ => {}
        }

        let map: TranslationMap = response.json().await?;
        Ok(if map.is_empty() { None } else { Some(map) })
    }
}

/// 不使用预翻译缓存
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContentCache;

impl TranslationCacheSource for NoContentCache {
    async fn lookup(&self, _content_id: &str, _target: Lang) -> TranslationResult<Option<TranslationMap>> {
        Ok(None)
    }
}

/// 可选的缓存来源：已配置则查询，否则视为未命中
impl<C: TranslationCacheSource> TranslationCacheSource for Option<C> {
    async fn lookup(&self, content_id: &str, target: Lang) -> TranslationResult<Option<TranslationMap>> {
        match self {
            Some(source) => source.lookup(content_id, target).await,
            None => Ok(None),
        }
    }
}
