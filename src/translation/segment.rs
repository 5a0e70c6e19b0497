//! 内容切分
//!
//! 把文章拆成带稳定索引的内容单元。索引在切分时一次确定，
//! 与预翻译缓存使用同一约定：0 标题，1 摘要，2 起为正文块。

use markup5ever_rcdom::{Handle, NodeData};

use crate::core::Lang;
use crate::parsers::html::{
    fragment_to_dom, get_body_node, is_blank_text, reading_text, serialize_node, WHITESPACES,
};
use crate::parsers::text::split_sentences;
use crate::translation::config::constants::{BODY_INDEX_OFFSET, DESCRIPTION_INDEX, TITLE_INDEX};

/// 内容单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Title,
    Description,
    BodyBlock,
    Sentence,
}

/// 切分模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// 正文顶层块元素，索引从 [`BODY_INDEX_OFFSET`] 开始
    HtmlBlocks,
    /// 按句子切分，索引从 0 开始
    Sentences,
}

/// 一个待翻译的内容单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    pub index: usize,
    pub kind: ContentKind,
    /// 正文块为序列化后的标记，其余为纯文本
    pub text: String,
    /// 发送给翻译接口的纯文本
    pub plain: String,
}

impl ContentUnit {
    /// 翻译表中使用的字符串键
    pub fn key(&self) -> String {
        self.index.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.plain.trim().is_empty()
    }
}

/// 一篇待阅读的文章
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub body_html: String,
    pub lang: Lang,
}

/// 内容切分器
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter;

impl Segmenter {
    pub fn new() -> Self {
        Self
    }

    /// 按模式切分内容
    pub fn segment(&self, content: &str, mode: SegmentMode, lang: Lang) -> Vec<ContentUnit> {
        match mode {
            SegmentMode::HtmlBlocks => html_blocks(content, BODY_INDEX_OFFSET),
            SegmentMode::Sentences => split_sentences(content, lang)
                .into_iter()
                .enumerate()
                .map(|(index, sentence)| ContentUnit {
                    index,
                    kind: ContentKind::Sentence,
                    plain: sentence.clone(),
                    text: sentence,
                })
                .collect(),
        }
    }

    /// 切分整篇文章：标题、摘要各占一个槽位（即使为空），其后为正文块
    pub fn segment_article(&self, article: &Article) -> Vec<ContentUnit> {
        let mut units = Vec::new();
        units.push(header_unit(TITLE_INDEX, ContentKind::Title, &article.title));
        units.push(header_unit(
            DESCRIPTION_INDEX,
            ContentKind::Description,
            &article.description,
        ));
        units.extend(self.segment(&article.body_html, SegmentMode::HtmlBlocks, article.lang));
        units
    }
}

fn header_unit(index: usize, kind: ContentKind, text: &str) -> ContentUnit {
    let plain = crate::parsers::text::strip_tags(text).trim().to_string();
    ContentUnit {
        index,
        kind,
        text: plain.clone(),
        plain,
    }
}

/// 提取正文顶层块
///
/// 元素子节点即使为空也占一个槽位；非空白的散落文本节点也作为一个单元；
/// 注释和空白文本不计。非空输入得不到任何单元时整体作为一个单元。
fn html_blocks(content: &str, offset: usize) -> Vec<ContentUnit> {
    let dom = fragment_to_dom(content);
    let mut units = Vec::new();

    if let Some(body) = get_body_node(&dom) {
        for child in body.children.borrow().iter() {
            if let Some(unit) = block_unit(child, offset + units.len()) {
                units.push(unit);
            }
        }
    }

    let trimmed = content.trim_matches(WHITESPACES);
    if units.is_empty() && !trimmed.is_empty() {
        tracing::debug!("正文没有可识别的块，整体作为一个单元");
        let plain = crate::parsers::text::strip_tags(trimmed).trim().to_string();
        units.push(ContentUnit {
            index: offset,
            kind: ContentKind::BodyBlock,
            text: trimmed.to_string(),
            plain: if plain.is_empty() { trimmed.to_string() } else { plain },
        });
    }

    units
}

fn block_unit(node: &Handle, index: usize) -> Option<ContentUnit> {
    match &node.data {
        NodeData::Element { .. } => {
            let plain = reading_text(node).trim().to_string();
            // 只有空白的元素不保留标记；含图片等子元素的保留
            let text = if plain.is_empty() && !has_child_elements(node) {
                String::new()
            } else {
                serialize_node(node)
            };
            Some(ContentUnit {
                index,
                kind: ContentKind::BodyBlock,
                text,
                plain,
            })
        }
        NodeData::Text { .. } if !is_blank_text(node) => Some(ContentUnit {
            index,
            kind: ContentKind::BodyBlock,
            text: serialize_node(node).trim().to_string(),
            plain: reading_text(node).trim().to_string(),
        }),
        _ => None,
    }
}

fn has_child_elements(node: &Handle) -> bool {
    node.children
        .borrow()
        .iter()
        .any(|child| matches!(child.data, NodeData::Element { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_blocks_offset_by_header_slots() {
        let units = Segmenter::new().segment("<p>A</p><p>B</p>", SegmentMode::HtmlBlocks, Lang::En);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].index, 2);
        assert_eq!(units[0].text, "<p>A</p>");
        assert_eq!(units[1].index, 3);
        assert_eq!(units[1].plain, "B");
    }

    #[test]
    fn test_empty_elements_keep_their_slot() {
        let units = Segmenter::new().segment(
            "<p>A</p>\n<p>  </p>\n<!-- note --><div><img src=\"x.png\"></div><p>C</p>",
            SegmentMode::HtmlBlocks,
            Lang::En,
        );
        let indices: Vec<usize> = units.iter().map(|u| u.index).collect();
        assert_eq!(indices, vec![2, 3, 4, 5]);
        assert!(units[1].is_empty());
        assert_eq!(units[1].text, "");
        assert!(units[2].is_empty());
        assert_eq!(units[2].text, "<div><img src=\"x.png\"></div>");
        assert_eq!(units[3].plain, "C");
    }

    #[test]
    fn test_loose_text_becomes_a_unit() {
        let units = Segmenter::new().segment("Intro text<p>Para</p>", SegmentMode::HtmlBlocks, Lang::En);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Intro text");
        assert_eq!(units[1].text, "<p>Para</p>");
    }

    #[test]
    fn test_plain_text_input_is_one_unit() {
        let units = Segmenter::new().segment("只是一段文字", SegmentMode::HtmlBlocks, Lang::Zh);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].plain, "只是一段文字");
    }

    #[test]
    fn test_malformed_html_degrades() {
        let units = Segmenter::new().segment("<div><p>unclosed <b>bold", SegmentMode::HtmlBlocks, Lang::En);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].plain, "unclosed bold");
    }

    #[test]
    fn test_sentences_are_zero_based() {
        let units = Segmenter::new().segment("第一句。第二句。", SegmentMode::Sentences, Lang::Zh);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].index, 0);
        assert_eq!(units[1].key(), "1");
        assert_eq!(units[1].kind, ContentKind::Sentence);
    }

    #[test]
    fn test_segment_article_reserves_header_slots() {
        let article = Article {
            id: "a1".to_string(),
            title: "标题".to_string(),
            description: String::new(),
            body_html: "<p>正文一</p><p>正文二</p>".to_string(),
            lang: Lang::Zh,
        };
        let units = Segmenter::new().segment_article(&article);
        assert_eq!(units.len(), 4);
        assert_eq!(units[0].kind, ContentKind::Title);
        assert_eq!(units[1].kind, ContentKind::Description);
        assert!(units[1].is_empty());
        assert_eq!(units[2].index, 2);
        assert_eq!(units[3].plain, "正文二");
    }
}
