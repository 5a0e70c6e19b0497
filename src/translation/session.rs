//! 翻译动作编排
//!
//! 一次“翻译”点击就是一个翻译动作：重置翻译表，先查预翻译缓存，
//! 未命中时为每个内容单元并发发起一次逐段翻译。每个请求独立成败，
//! 完成后把结果写进翻译表对应的键，并通过 watch 通道通知界面重新渲染。
//!
//! 每个动作带有递增的代号。请求回来时若代号已不是当前代号，
//! 说明用户已重新触发翻译，这次写入被丢弃。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::Lang;
use crate::translation::error::TranslationError;
use crate::translation::map::TranslationMap;
use crate::translation::provider::{TranslationCacheSource, UnitTranslator};
use crate::translation::render::{render, RenderSegment};
use crate::translation::segment::{Article, ContentKind, ContentUnit, Segmenter};

/// 翻译状态，单向推进；重新触发时回到 `Untranslated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationState {
    Untranslated,
    Translating,
    Translated,
}

#[derive(Debug, Default)]
struct MapSlot {
    generation: u64,
    active: bool,
    map: TranslationMap,
}

#[derive(Debug)]
struct SharedState {
    generation: AtomicU64,
    slot: RwLock<MapSlot>,
    revision: watch::Sender<u64>,
}

impl SharedState {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// 写入一个单元的结果；动作已过期时丢弃并返回 false
    fn write(&self, generation: u64, index: usize, text: &str) -> bool {
        {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            if slot.generation != generation {
                tracing::debug!(
                    "丢弃过期写入: 单元 {} 属于动作 {}，当前动作 {}",
                    index,
                    generation,
                    slot.generation
                );
                return false;
            }
            slot.map.insert(index, text.trim());
        }
        self.notify();
        true
    }

    /// 开始新动作：代号加一并清空翻译表
    fn begin(&self) -> u64 {
        let generation = {
            let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = MapSlot {
                generation,
                active: true,
                map: TranslationMap::new(),
            };
            generation
        };
        self.notify();
        generation
    }
}

/// 单个单元的结局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitResult {
    Translated,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct UnitReport {
    result: UnitResult,
    stale: bool,
}

/// 一次翻译动作的汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub generation: u64,
    /// 单元总数（含空单元）
    pub total: usize,
    /// 实际发起请求的单元数
    pub requested: usize,
    pub translated: usize,
    pub failed: usize,
    pub from_cache: bool,
    /// 动作结束前已被新动作取代
    pub superseded: bool,
}

impl ActionOutcome {
    /// 所有发起请求的单元都失败了
    pub fn is_total_failure(&self) -> bool {
        !self.from_cache && self.requested > 0 && self.failed == self.requested
    }
}

/// 进行中的翻译动作
///
/// 丢弃句柄不会取消请求；请求结束后照常写入（或因过期被丢弃）。
#[derive(Debug)]
pub struct ActionHandle {
    generation: u64,
    total: usize,
    requested: usize,
    from_cache: bool,
    /// 缓存命中时已写入的非空译文数
    cached_translated: usize,
    tasks: Vec<(usize, JoinHandle<UnitReport>)>,
    shared: Arc<SharedState>,
}

impl ActionHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// 等待所有请求结束
    pub async fn settled(self) -> ActionOutcome {
        let (indices, handles): (Vec<usize>, Vec<JoinHandle<UnitReport>>) =
            self.tasks.into_iter().unzip();

        let mut translated = 0;
        let mut failed = 0;
        let mut stale = 0;

        for (index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(report) => {
                    match report.result {
                        UnitResult::Translated => translated += 1,
                        UnitResult::Failed => failed += 1,
                    }
                    if report.stale {
                        stale += 1;
                    }
                }
                Err(e) => {
                    failed += 1;
                    TranslationError::from(e).with_context(format!("单元 {}", index)).log();
                    self.shared.write(self.generation, index, "");
                }
            }
        }

        let superseded = stale > 0 || self.shared.current_generation() != self.generation;
        let outcome = ActionOutcome {
            generation: self.generation,
            total: self.total,
            requested: self.requested,
            translated: translated + self.cached_translated,
            failed,
            from_cache: self.from_cache,
            superseded,
        };

        if outcome.is_total_failure() && !superseded {
            tracing::error!(
                "翻译失败：{} 个单元全部未能翻译，可以稍后重试",
                outcome.requested
            );
        } else {
            tracing::info!(
                "翻译动作 {} 结束: 成功 {}, 失败 {}, 缓存 {}",
                outcome.generation,
                outcome.translated,
                outcome.failed,
                outcome.from_cache
            );
        }

        outcome
    }
}

/// 翻译会话：持有翻译来源和当前翻译表
#[derive(Debug)]
pub struct TranslationSession<T, C> {
    translator: Arc<T>,
    cache: Arc<C>,
    shared: Arc<SharedState>,
}

impl<T, C> Clone for TranslationSession<T, C> {
    fn clone(&self) -> Self {
        Self {
            translator: Arc::clone(&self.translator),
            cache: Arc::clone(&self.cache),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: UnitTranslator, C: TranslationCacheSource> TranslationSession<T, C> {
    pub fn new(translator: T, cache: C) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            translator: Arc::new(translator),
            cache: Arc::new(cache),
            shared: Arc::new(SharedState {
                generation: AtomicU64::new(0),
                slot: RwLock::new(MapSlot::default()),
                revision,
            }),
        }
    }

    /// 订阅翻译表变更；每次写入修订号加一
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// 当前动作代号（0 表示从未开始）
    pub fn generation(&self) -> u64 {
        self.shared.current_generation()
    }

    /// 当前翻译表的快照
    pub fn snapshot(&self) -> TranslationMap {
        self.shared
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .clone()
    }

    /// 当前状态
    pub fn state(&self, units: &[ContentUnit]) -> TranslationState {
        let slot = self.shared.slot.read().unwrap_or_else(PoisonError::into_inner);
        if !slot.active {
            TranslationState::Untranslated
        } else if units.iter().all(|unit| slot.map.contains(unit.index)) {
            TranslationState::Translated
        } else {
            TranslationState::Translating
        }
    }

    /// 放弃当前动作，回到未翻译状态；进行中的请求结果将被丢弃
    pub fn reset(&self) {
        {
            let mut slot = self.shared.slot.write().unwrap_or_else(PoisonError::into_inner);
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = MapSlot {
                generation,
                active: false,
                map: TranslationMap::new(),
            };
        }
        self.shared.notify();
    }

    /// 用当前翻译表渲染
    pub fn render(&self, units: &[ContentUnit], show_translation: bool) -> Vec<RenderSegment> {
        render(units, &self.snapshot(), show_translation)
    }

    /// 切分文章并开始翻译
    pub async fn start_article(&self, article: &Article, target: Lang) -> (Vec<ContentUnit>, ActionHandle) {
        let units = Segmenter::new().segment_article(article);
        let content_id = (!article.id.is_empty()).then_some(article.id.as_str());
        let handle = self.start(content_id, &units, article.lang, target).await;
        (units, handle)
    }

    /// 开始一次翻译动作
    ///
    /// 有内容 id 时先查预翻译缓存；缓存与当前单元一致则整体采用，
    /// 否则（未命中、出错或不一致）为每个非空单元并发发起逐段翻译。
    pub async fn start(
        &self,
        content_id: Option<&str>,
        units: &[ContentUnit],
        source: Lang,
        target: Lang,
    ) -> ActionHandle {
        let generation = self.shared.begin();
        tracing::info!("开始翻译动作 {}: {} 个单元", generation, units.len());

        if let Some(content_id) = content_id {
            if let Some(handle) = self.try_cache(generation, content_id, units, target).await {
                return handle;
            }
        }

        let mut tasks = Vec::new();
        let mut requested = 0;

        for unit in units {
            if unit.is_empty() {
                self.shared.write(generation, unit.index, "");
                continue;
            }

            requested += 1;
            let translator = Arc::clone(&self.translator);
            let shared = Arc::clone(&self.shared);
            let index = unit.index;
            let kind = unit.kind;
            let text = unit.plain.clone();

            let task = tokio::spawn(async move {
                let (written, result) = match translator.translate(&text, source, target).await {
                    Ok(translated) => {
                        let result = if translated.trim().is_empty() {
                            UnitResult::Failed
                        } else {
                            UnitResult::Translated
                        };
                        (shared.write(generation, index, &translated), result)
                    }
                    Err(e) => {
                        tracing::warn!("单元 {} ({:?}) 翻译失败: {}", index, kind, e);
                        (shared.write(generation, index, ""), UnitResult::Failed)
                    }
                };
                UnitReport {
                    result,
                    stale: !written,
                }
            });
            tasks.push((index, task));
        }

        ActionHandle {
            generation,
            total: units.len(),
            requested,
            from_cache: false,
            cached_translated: 0,
            tasks,
            shared: Arc::clone(&self.shared),
        }
    }

    async fn try_cache(
        &self,
        generation: u64,
        content_id: &str,
        units: &[ContentUnit],
        target: Lang,
    ) -> Option<ActionHandle> {
        let cached = match self.cache.lookup(content_id, target).await {
            Ok(Some(map)) => map,
            Ok(None) => {
                tracing::debug!("预翻译缓存未命中: {}", content_id);
                return None;
            }
            Err(e) => {
                e.with_context(format!("内容 {}", content_id)).log();
                return None;
            }
        };

        if !cache_matches(&cached, units) {
            tracing::warn!("预翻译缓存与当前内容不一致，已作废: {}", content_id);
            return None;
        }

        let mut requested = 0;
        let mut cached_translated = 0;
        {
            let mut slot = self.shared.slot.write().unwrap_or_else(PoisonError::into_inner);
            if slot.generation != generation {
                tracing::debug!("缓存结果到达时动作 {} 已过期", generation);
            } else {
                for unit in units {
                    let text = cached.get(unit.index).unwrap_or_default();
                    if !unit.is_empty() {
                        requested += 1;
                        if !text.trim().is_empty() {
                            cached_translated += 1;
                        }
                    }
                    slot.map.insert(unit.index, text.trim());
                }
            }
        }
        self.shared.notify();

        tracing::info!("使用预翻译缓存: {}", content_id);
        Some(ActionHandle {
            generation,
            total: units.len(),
            requested,
            from_cache: true,
            cached_translated,
            tasks: Vec::new(),
            shared: Arc::clone(&self.shared),
        })
    }
}

/// 预翻译缓存是否与当前切分结果一致
///
/// 要求：所有键都是数字索引，没有超出最后一个单元的索引，
/// 且每个非空的正文块或句子都有对应的键。标题和摘要可以缺失。
pub fn cache_matches(cached: &TranslationMap, units: &[ContentUnit]) -> bool {
    let Some(last_index) = units.iter().map(|unit| unit.index).max() else {
        return false;
    };

    if cached.has_foreign_keys() || cached.indices().any(|index| index > last_index) {
        return false;
    }

    units
        .iter()
        .filter(|unit| !matches!(unit.kind, ContentKind::Title | ContentKind::Description))
        .filter(|unit| !unit.is_empty())
        .all(|unit| cached.contains(unit.index))
}
