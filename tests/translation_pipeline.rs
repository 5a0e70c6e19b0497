//! 翻译流水线集成测试
//!
//! 切分 → 并发逐段翻译 → 交错渲染的端到端行为

use std::time::Duration;

use shuijiao::core::Lang;
use shuijiao::translation::{
    render, render_article, translate_article, ContentKind, NoContentCache, RenderSegment,
    SegmentMode, Segmenter, TranslationSession, TranslationState, UnitStatus,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{ArticleFixtures, MockCache, MockTranslator, PerformanceHelper};

/// 所有单元都翻译成功
#[tokio::test]
async fn test_full_article_translation() {
    let translator = MockTranslator::new();
    let session = TranslationSession::new(translator.clone(), NoContentCache);
    let article = ArticleFixtures::news();

    let (units, handle) = session.start_article(&article, Lang::Vi).await;
    let outcome = handle.settled().await;

    assert_eq!(units.len(), 5, "title + description + 3 body blocks");
    assert_eq!(outcome.total, 5);
    assert_eq!(outcome.translated, 5);
    assert_eq!(outcome.failed, 0);
    assert!(!outcome.from_cache);
    assert!(!outcome.superseded);
    assert_eq!(translator.calls(), 5);
    assert_eq!(session.state(&units), TranslationState::Translated);

    let rendered = render_article(&units, &session.snapshot(), true);
    assert_eq!(
        rendered.title.translation.as_deref(),
        Some(MockTranslator::expected("北京今天下雪了").as_str())
    );
    assert_eq!(rendered.body.len(), 6);
    assert_eq!(
        rendered.body[1],
        RenderSegment::Translation {
            index: 2,
            text: MockTranslator::expected("第一段。"),
        }
    );

    println!("✅ Full article translation passed");
}

/// 整篇翻译的汇总结果与会话快照一致
#[tokio::test]
async fn test_translate_article_collects_result() {
    let translator = MockTranslator::new().failing_on("第三段。");
    let session = TranslationSession::new(translator, NoContentCache);
    let article = ArticleFixtures::news();

    let translation = translate_article(&session, &article, Lang::Vi).await;

    assert_eq!(translation.units.len(), 5);
    assert_eq!(translation.outcome.translated, 4);
    assert_eq!(translation.outcome.failed, 1);
    assert_eq!(translation.translations, session.snapshot());

    let rendered = translation.render(true);
    assert_eq!(
        rendered.description.translation.as_deref(),
        Some(MockTranslator::expected("气象台发布消息").as_str())
    );
    assert_eq!(rendered.body.iter().filter(|s| s.is_translation()).count(), 2);
    assert!(translation.render(false).body.iter().all(|s| !s.is_translation()));
}

/// 单个单元失败只影响自己
#[tokio::test]
async fn test_one_failed_block_is_isolated() {
    let translator = MockTranslator::new().failing_on("第二段。");
    let session = TranslationSession::new(translator, NoContentCache);
    let units = Segmenter::new().segment(
        "<p>第一段。</p><p>第二段。</p><p>第三段。</p>",
        SegmentMode::HtmlBlocks,
        Lang::Zh,
    );

    let outcome = session.start(None, &units, Lang::Zh, Lang::Vi).await.settled().await;
    assert_eq!(outcome.translated, 2);
    assert_eq!(outcome.failed, 1);
    assert!(!outcome.is_total_failure());

    let map = session.snapshot();
    assert_eq!(map.len(), 3);
    assert_eq!(map.status(3), UnitStatus::GaveUp);
    assert_eq!(map.gave_up_count(), 1);

    let segments = render(&units, &map, true);
    let translated: Vec<usize> = segments
        .iter()
        .filter(|s| s.is_translation())
        .map(|s| s.index())
        .collect();
    assert_eq!(translated, vec![2, 4]);
    assert_eq!(session.state(&units), TranslationState::Translated);
}

/// 全部失败时汇总为整体失败
#[tokio::test]
async fn test_total_failure_is_reported() {
    let translator = MockTranslator::always_failing(&["一。", "二。"]);
    let session = TranslationSession::new(translator, NoContentCache);
    let units = Segmenter::new().segment("一。二。", SegmentMode::Sentences, Lang::Zh);

    let outcome = session.start(None, &units, Lang::Zh, Lang::Vi).await.settled().await;
    assert_eq!(outcome.requested, 2);
    assert!(outcome.is_total_failure());

    // 失败的单元仍然结束，渲染为未翻译
    assert_eq!(session.state(&units), TranslationState::Translated);
    assert!(render(&units, &session.snapshot(), true)
        .iter()
        .all(|s| !s.is_translation()));
}

/// 重新触发后，旧动作迟到的结果被丢弃
#[tokio::test]
async fn test_stale_results_are_dropped() {
    let translator = MockTranslator::new().delayed("慢句。", Duration::from_millis(150));
    let session = TranslationSession::new(translator, NoContentCache);
    let segmenter = Segmenter::new();

    let old_units = segmenter.segment("慢句。", SegmentMode::Sentences, Lang::Zh);
    let new_units = segmenter.segment("快句。", SegmentMode::Sentences, Lang::Zh);
    assert_eq!(old_units[0].index, new_units[0].index);

    let old = session.start(None, &old_units, Lang::Zh, Lang::Vi).await;
    let new = session.start(None, &new_units, Lang::Zh, Lang::Vi).await;
    assert!(new.generation() > old.generation());

    let new_outcome = new.settled().await;
    let old_outcome = old.settled().await;

    assert!(old_outcome.superseded);
    assert!(!new_outcome.superseded);
    assert_eq!(
        session.snapshot().get(0),
        Some(MockTranslator::expected("快句。").as_str())
    );
}

/// 完成顺序与渲染顺序无关
#[tokio::test]
async fn test_out_of_order_completion_keeps_document_order() {
    let translator = MockTranslator::new()
        .delayed("A", Duration::from_millis(60))
        .delayed("B", Duration::from_millis(30));
    let session = TranslationSession::new(translator, NoContentCache);
    let units = Segmenter::new().segment("<p>A</p><p>B</p><p>C</p>", SegmentMode::HtmlBlocks, Lang::En);

    let mut revisions = session.subscribe();
    let handle = session.start(None, &units, Lang::En, Lang::Vi).await;

    // C 先到：此时 A、B 仍未返回
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(session.state(&units), TranslationState::Translating);
    let partial = render(&units, &session.snapshot(), true);
    assert_eq!(partial.len(), 4);
    assert_eq!(partial[3].index(), 4);

    handle.settled().await;
    assert!(revisions.has_changed().unwrap());

    let segments = render(&units, &session.snapshot(), true);
    let order: Vec<(usize, bool)> = segments.iter().map(|s| (s.index(), s.is_translation())).collect();
    assert_eq!(
        order,
        vec![(2, false), (2, true), (3, false), (3, true), (4, false), (4, true)]
    );
}

/// 空单元直接结束，不发请求
#[tokio::test]
async fn test_empty_units_settle_without_requests() {
    let translator = MockTranslator::new();
    let session = TranslationSession::new(translator.clone(), NoContentCache);
    let article = ArticleFixtures::untitled_body("<p>内容</p><p> </p>");

    let (units, handle) = session.start_article(&article, Lang::Vi).await;
    let outcome = handle.settled().await;

    assert_eq!(units.len(), 4);
    assert_eq!(units[0].kind, ContentKind::Title);
    assert_eq!(outcome.requested, 1);
    assert_eq!(translator.calls(), 1);
    assert_eq!(session.snapshot().status(0), UnitStatus::GaveUp);
    assert_eq!(session.snapshot().status(3), UnitStatus::GaveUp);
    assert_eq!(session.state(&units), TranslationState::Translated);
}

/// 一致的预翻译缓存整体采用
#[tokio::test]
async fn test_consistent_cache_skips_requests() {
    let article = ArticleFixtures::news();
    let payload = ArticleFixtures::map(&[
        (0, "Bắc Kinh có tuyết"),
        (1, ""),
        (2, "Đoạn một."),
        (3, "Đoạn hai."),
        (4, "Đoạn ba."),
    ]);
    let cache = MockCache::new().with_payload(&article.id, payload);
    let translator = MockTranslator::new();
    let session = TranslationSession::new(translator.clone(), cache.clone());

    let (units, handle) = session.start_article(&article, Lang::Vi).await;
    assert!(handle.from_cache());
    let outcome = handle.settled().await;

    assert!(outcome.from_cache);
    assert_eq!(outcome.translated, 4);
    assert_eq!(translator.calls(), 0);
    assert_eq!(cache.lookups(), 1);
    assert_eq!(session.state(&units), TranslationState::Translated);

    let rendered = render_article(&units, &session.snapshot(), true);
    assert_eq!(rendered.title.translation.as_deref(), Some("Bắc Kinh có tuyết"));
    assert_eq!(rendered.description.translation, None);
}

/// 与切分结果不一致的缓存作废，回退到逐段翻译
#[tokio::test]
async fn test_mismatched_cache_falls_back() {
    let article = ArticleFixtures::news();

    // 文章修改后多了一段：缓存缺少索引 4
    let stale = ArticleFixtures::map(&[(0, "t"), (2, "một"), (3, "hai")]);
    // 文章修改后少了一段：缓存有多余的索引 5
    let longer = ArticleFixtures::map(&[(2, "một"), (3, "hai"), (4, "ba"), (5, "bốn")]);

    for payload in [stale, longer] {
        let cache = MockCache::new().with_payload(&article.id, payload);
        let translator = MockTranslator::new();
        let session = TranslationSession::new(translator.clone(), cache);

        let (_, handle) = session.start_article(&article, Lang::Vi).await;
        assert!(!handle.from_cache());
        let outcome = handle.settled().await;

        assert_eq!(translator.calls(), 5);
        assert_eq!(outcome.translated, 5);
        assert_eq!(
            session.snapshot().get(4),
            Some(MockTranslator::expected("第三段。").as_str())
        );
    }
}

/// 句子模式下缺句的缓存同样作废
#[tokio::test]
async fn test_partial_sentence_cache_falls_back() {
    let units = Segmenter::new().segment("一。二。三。", SegmentMode::Sentences, Lang::Zh);
    assert_eq!(units.len(), 3);

    let cache = MockCache::new().with_payload("lesson-1", ArticleFixtures::map(&[(0, "một")]));
    let translator = MockTranslator::new();
    let session = TranslationSession::new(translator.clone(), cache);

    let handle = session.start(Some("lesson-1"), &units, Lang::Zh, Lang::Vi).await;
    assert!(!handle.from_cache());
    let outcome = handle.settled().await;

    assert_eq!(translator.calls(), 3);
    assert_eq!(outcome.translated, 3);
    let map = session.snapshot();
    assert!(matches!(map.status(1), UnitStatus::Translated(_)));
    assert_eq!(map.get(2), Some(MockTranslator::expected("三。").as_str()));
}

/// 缓存出错视为未命中
#[tokio::test]
async fn test_broken_cache_falls_back() {
    let translator = MockTranslator::new();
    let session = TranslationSession::new(translator.clone(), MockCache::broken());

    let (_, handle) = session.start_article(&ArticleFixtures::news(), Lang::Vi).await;
    let outcome = handle.settled().await;

    assert!(!outcome.from_cache);
    assert_eq!(outcome.failed, 0);
    assert_eq!(translator.calls(), 5);
}

/// 重置回到未翻译状态
#[tokio::test]
async fn test_state_transitions() {
    let session = TranslationSession::new(MockTranslator::new(), NoContentCache);
    let units = Segmenter::new().segment("你好。", SegmentMode::Sentences, Lang::Zh);

    assert_eq!(session.state(&units), TranslationState::Untranslated);
    assert_eq!(session.generation(), 0);

    session.start(None, &units, Lang::Zh, Lang::Vi).await.settled().await;
    assert_eq!(session.state(&units), TranslationState::Translated);

    session.reset();
    assert_eq!(session.state(&units), TranslationState::Untranslated);
    assert!(session.snapshot().is_empty());
    assert!(render(&units, &session.snapshot(), true).iter().all(|s| !s.is_translation()));
}

/// 并发请求而不是逐个等待
#[tokio::test]
async fn test_units_are_requested_concurrently() {
    let delay = Duration::from_millis(100);
    let translator = MockTranslator::new()
        .delayed("一。", delay)
        .delayed("二。", delay)
        .delayed("三。", delay);
    let session = TranslationSession::new(translator, NoContentCache);
    let units = Segmenter::new().segment("一。二。三。", SegmentMode::Sentences, Lang::Zh);

    let (outcome, elapsed) = PerformanceHelper::measure_async_time(|| async {
        session.start(None, &units, Lang::Zh, Lang::Vi).await.settled().await
    })
    .await;

    assert_eq!(outcome.translated, 3);
    assert!(elapsed < delay * 3, "requests should overlap, took {:?}", elapsed);
}
