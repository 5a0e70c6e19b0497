//! 中英文句子切分
//!
//! 用于分享和朗读：先去掉标签与注音，再按句末标点切句。

use crate::core::Lang;
use crate::parsers::html::{fragment_to_dom, get_body_node, reading_text};

/// 全角句末标点，出现即断句
const CJK_TERMINATORS: &[char] = &['。', '！', '？'];

/// 半角句末标点，后接空白或文本结尾时断句
const ASCII_TERMINATORS: &[char] = &['.', '!', '?'];

/// 句末标点后仍归属当前句的闭合符号
const CLOSERS: &[char] = &['”', '’', '」', '』', '）', '》', '】', '"', '\'', ')'];

/// 过滤中文文本时保留的标点
const KEPT_PUNCTUATION: &[char] = &[
    '。', '，', '、', '；', '：', '？', '！', '“', '”', '‘', '’', '《', '》', '【', '】', '…', '—',
    '·', '「', '」', '『', '』', '（', '）', ',', '.', '!', '?', ';', ':', '"', '\'',
];

/// 判断字符是否属于 CJK 统一表意文字（基本区、扩展 A、兼容区）
pub fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}')
}

/// 去掉 HTML 标签、实体和注音，返回阅读文本
pub fn strip_tags(content: &str) -> String {
    let dom = fragment_to_dom(content);
    match get_body_node(&dom) {
        Some(body) => reading_text(&body),
        None => content.to_string(),
    }
}

/// 去掉半角和全角括号内的注释（如拼音）
///
/// 未闭合的括号原样保留。
pub fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' | '（' => {
                depth += 1;
                pending.push(c);
            }
            ')' | '）' if depth > 0 => {
                depth -= 1;
                pending.push(c);
                if depth == 0 {
                    pending.clear();
                }
            }
            _ if depth > 0 => pending.push(c),
            _ => out.push(c),
        }
    }

    out.push_str(&pending);
    out
}

/// 只保留 CJK 字符和白名单标点，其余连续字符折叠为一个空格
pub fn filter_cjk(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_filler = false;

    for c in text.chars() {
        if is_cjk(c) || KEPT_PUNCTUATION.contains(&c) {
            out.push(c);
            in_filler = false;
        } else if !in_filler {
            out.push(' ');
            in_filler = true;
        }
    }

    out.trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_terminator(c: char) -> bool {
    CJK_TERMINATORS.contains(&c) || ASCII_TERMINATORS.contains(&c)
}

/// 按句末标点切分已清洗的文本
fn scan_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        i += 1;

        if !is_terminator(c) {
            continue;
        }

        let mut saw_cjk = CJK_TERMINATORS.contains(&c);
        while i < chars.len() && (is_terminator(chars[i]) || CLOSERS.contains(&chars[i])) {
            saw_cjk |= CJK_TERMINATORS.contains(&chars[i]);
            current.push(chars[i]);
            i += 1;
        }

        let at_boundary = saw_cjk || i == chars.len() || chars[i].is_whitespace();
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

/// 将文本切分为句子
///
/// 非空输入至少返回一个元素；找不到句末标点时整段清洗后的文本作为唯一一句。
pub fn split_sentences(content: &str, lang: Lang) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let plain = strip_tags(content);
    let cleaned = match lang {
        Lang::Zh => filter_cjk(&strip_annotations(&plain)),
        Lang::En | Lang::Vi => collapse_whitespace(&plain),
    };

    let sentences = scan_sentences(&cleaned);
    if !sentences.is_empty() {
        return sentences;
    }

    // 过滤后为空（例如中文模式下的纯英文输入）时退回原文
    let fallback = if cleaned.is_empty() {
        collapse_whitespace(&plain)
    } else {
        cleaned
    };
    if fallback.is_empty() {
        vec![content.trim().to_string()]
    } else {
        vec![fallback]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_with_pinyin_annotation() {
        let sentences = split_sentences("你好(nǐ hǎo)。今天天气很好！", Lang::Zh);
        assert_eq!(sentences, vec!["你好。", "今天天气很好！"]);
    }

    #[test]
    fn test_english_with_markup() {
        let sentences = split_sentences("<b>Hello.</b> How are you?", Lang::En);
        assert_eq!(sentences, vec!["Hello.", "How are you?"]);
    }

    #[test]
    fn test_no_terminator_yields_single_sentence() {
        assert_eq!(split_sentences("学习中文", Lang::Zh), vec!["学习中文"]);
        assert_eq!(split_sentences("no punctuation here", Lang::En), vec!["no punctuation here"]);
    }

    #[test]
    fn test_non_cjk_input_in_chinese_mode_is_not_empty() {
        assert_eq!(split_sentences("hello world", Lang::Zh), vec!["hello world"]);
    }

    #[test]
    fn test_whitespace_only_input_yields_one_element() {
        assert_eq!(split_sentences("   ", Lang::En).len(), 1);
        assert!(split_sentences("", Lang::En).is_empty());
    }

    #[test]
    fn test_ruby_annotations_removed() {
        let html = "<ruby>中<rt>zhōng</rt></ruby><ruby>国<rt>guó</rt></ruby>很大。";
        assert_eq!(split_sentences(html, Lang::Zh), vec!["中国很大。"]);
    }

    #[test]
    fn test_fullwidth_parentheses_removed() {
        assert_eq!(strip_annotations("北京（Běijīng）是首都"), "北京是首都");
        assert_eq!(strip_annotations("未闭合(abc"), "未闭合(abc");
    }

    #[test]
    fn test_filler_collapsed_to_single_space() {
        assert_eq!(filter_cjk("我有3个apple和 两个梨"), "我有 个 和 两个梨");
    }

    #[test]
    fn test_ascii_period_inside_token_does_not_split() {
        let sentences = split_sentences("Version 2.5 is out. Try it!", Lang::En);
        assert_eq!(sentences, vec!["Version 2.5 is out.", "Try it!"]);
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let sentences = split_sentences("他说：“我来了。”然后走了。", Lang::Zh);
        assert_eq!(sentences, vec!["他说：“我来了。”", "然后走了。"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "第一句。第二句！第三句？";
        assert_eq!(split_sentences(text, Lang::Zh), split_sentences(text, Lang::Zh));
        assert_eq!(split_sentences(text, Lang::Zh).len(), 3);
    }
}
