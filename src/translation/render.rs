//! 双语交错渲染
//!
//! 纯函数：给定内容单元和翻译表，得到按原文顺序排列的渲染片段，
//! 每个有译文的单元后面紧跟一段译文。翻译表每次更新都可以整段重算。

use crate::parsers::html::escape_html;
use crate::translation::config::constants::BODY_INDEX_OFFSET;
use crate::translation::map::TranslationMap;
use crate::translation::segment::{ContentKind, ContentUnit};

/// 译文段落的 class
pub const TRANSLATION_CLASS: &str = "shuijiao-translation";

/// 一个渲染片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderSegment {
    /// 原文（正文块为原始标记）
    Original { index: usize, markup: String },
    /// 译文纯文本
    Translation { index: usize, text: String },
}

impl RenderSegment {
    pub fn index(&self) -> usize {
        match self {
            RenderSegment::Original { index, .. } | RenderSegment::Translation { index, .. } => *index,
        }
    }

    pub fn is_translation(&self) -> bool {
        matches!(self, RenderSegment::Translation { .. })
    }
}

/// 交错渲染
///
/// 缺失或为空的译文不产生片段，该单元显示为未翻译。
pub fn render(units: &[ContentUnit], translations: &TranslationMap, show_translation: bool) -> Vec<RenderSegment> {
    let mut segments = Vec::with_capacity(units.len() * 2);

    for unit in units {
        segments.push(RenderSegment::Original {
            index: unit.index,
            markup: unit.text.clone(),
        });

        if !show_translation {
            continue;
        }
        if let Some(text) = translations.translation(unit.index) {
            segments.push(RenderSegment::Translation {
                index: unit.index,
                text: text.to_string(),
            });
        }
    }

    segments
}

/// 标题或摘要槽位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSlot {
    pub original: String,
    pub translation: Option<String>,
}

/// 整篇文章的渲染结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedArticle {
    pub title: HeaderSlot,
    pub description: HeaderSlot,
    pub body: Vec<RenderSegment>,
}

impl RenderedArticle {
    /// 正文部分的 HTML
    pub fn body_html(&self) -> String {
        segments_to_html(&self.body)
    }
}

/// 渲染整篇文章：标题、摘要单独放置，正文从索引 2 开始交错
pub fn render_article(units: &[ContentUnit], translations: &TranslationMap, show_translation: bool) -> RenderedArticle {
    let header = |kind: ContentKind| {
        units
            .iter()
            .find(|unit| unit.kind == kind)
            .map(|unit| HeaderSlot {
                original: unit.text.clone(),
                translation: show_translation
                    .then(|| translations.translation(unit.index))
                    .flatten()
                    .map(str::to_string),
            })
            .unwrap_or_default()
    };

    let body: Vec<ContentUnit> = units
        .iter()
        .filter(|unit| unit.index >= BODY_INDEX_OFFSET && unit.kind == ContentKind::BodyBlock)
        .cloned()
        .collect();

    RenderedArticle {
        title: header(ContentKind::Title),
        description: header(ContentKind::Description),
        body: render(&body, translations, show_translation),
    }
}

/// 拼成 HTML：原文原样输出，译文转义后放进带标记的段落
pub fn segments_to_html(segments: &[RenderSegment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            RenderSegment::Original { markup, .. } => html.push_str(markup),
            RenderSegment::Translation { index, text } => {
                html.push_str(&format!(
                    "<p class=\"{}\" data-index=\"{}\">{}</p>",
                    TRANSLATION_CLASS,
                    index,
                    escape_html(text)
                ));
            }
        }
        html.push('\n');
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Lang;
    use crate::translation::segment::{Article, SegmentMode, Segmenter};

    fn body_units() -> Vec<ContentUnit> {
        Segmenter::new().segment("<p>A</p><p>B</p>", SegmentMode::HtmlBlocks, Lang::En)
    }

    #[test]
    fn test_interleaves_available_translations() {
        let units = body_units();
        let map: TranslationMap = [(2, "a".to_string())].into_iter().collect();

        let segments = render(&units, &map, true);
        assert_eq!(
            segments,
            vec![
                RenderSegment::Original { index: 2, markup: "<p>A</p>".to_string() },
                RenderSegment::Translation { index: 2, text: "a".to_string() },
                RenderSegment::Original { index: 3, markup: "<p>B</p>".to_string() },
            ]
        );
    }

    #[test]
    fn test_hidden_translations_and_empty_map_match() {
        let units = body_units();
        let full: TranslationMap = [(2, "a".to_string()), (3, "b".to_string())].into_iter().collect();

        let hidden = render(&units, &full, false);
        let toggled = render(&units, &TranslationMap::new(), true);
        assert_eq!(hidden, toggled);
        assert!(hidden.iter().all(|s| !s.is_translation()));
    }

    #[test]
    fn test_render_is_idempotent() {
        let units = body_units();
        let map: TranslationMap = [(3, "b".to_string())].into_iter().collect();
        assert_eq!(render(&units, &map, true), render(&units, &map, true));
    }

    #[test]
    fn test_more_translations_only_add_segments() {
        let units = body_units();
        let mut map = TranslationMap::new();
        map.insert(3, "b");
        let before = render(&units, &map, true);

        map.insert(2, "a");
        let after = render(&units, &map, true);

        let mut remaining = after.iter();
        for segment in &before {
            assert!(remaining.any(|s| s == segment), "missing {:?}", segment);
        }
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn test_gave_up_units_render_untranslated() {
        let units = body_units();
        let mut map = TranslationMap::new();
        map.give_up(2);
        map.insert(3, "b");
        let segments = render(&units, &map, true);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].index(), 3);
        assert!(segments[2].is_translation());
    }

    #[test]
    fn test_render_article_places_header_slots() {
        let article = Article {
            id: "n1".to_string(),
            title: "新闻".to_string(),
            description: "摘要".to_string(),
            body_html: "<p>一</p><p>二</p>".to_string(),
            lang: Lang::Zh,
        };
        let units = Segmenter::new().segment_article(&article);
        let map: TranslationMap = [(0, "Tin tức".to_string()), (3, "hai".to_string())]
            .into_iter()
            .collect();

        let rendered = render_article(&units, &map, true);
        assert_eq!(rendered.title.original, "新闻");
        assert_eq!(rendered.title.translation.as_deref(), Some("Tin tức"));
        assert_eq!(rendered.description.translation, None);
        assert_eq!(rendered.body.len(), 3);
        assert_eq!(rendered.body[0].index(), 2);

        let hidden = render_article(&units, &map, false);
        assert_eq!(hidden.title.translation, None);
    }

    #[test]
    fn test_segments_to_html_escapes_translations() {
        let segments = vec![
            RenderSegment::Original { index: 2, markup: "<p>A</p>".to_string() },
            RenderSegment::Translation { index: 2, text: "a < b".to_string() },
        ];
        assert_eq!(
            segments_to_html(&segments),
            "<p>A</p>\n<p class=\"shuijiao-translation\" data-index=\"2\">a &lt; b</p>\n"
        );
    }
}
