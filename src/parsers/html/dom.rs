use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::utils::{RUBY_ANNOTATION_ELEMENTS, WHITESPACES};

/// 按给定编码标签把字节解码为字符串，未知标签按 UTF-8 宽松解码
pub fn decode_bytes(data: &[u8], document_encoding: &str) -> String {
    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    }
}

/// 将 HTML 片段解析为 DOM
///
/// html5ever 会补全 `html`/`head`/`body`，片段内容落在 `body` 下。
/// 解析器对任何输入都能恢复，读取失败时返回空文档。
pub fn fragment_to_dom(content: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut content.as_bytes())
        .unwrap_or_default()
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取文档的 body 节点
pub fn get_body_node(dom: &RcDom) -> Option<Handle> {
    let html = get_child_node_by_name(&dom.document, "html")?;
    get_child_node_by_name(&html, "body")
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 判断节点是否为纯空白文本
pub fn is_blank_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().trim_matches(WHITESPACES).is_empty(),
        _ => false,
    }
}

/// 收集节点下的纯文本，跳过 `skip` 中列出的元素子树
pub fn text_content(node: &Handle, skip: &[&str]) -> String {
    let mut out = String::new();
    collect_text(node, skip, &mut out);
    out
}

/// 收集节点下的纯文本，同时去掉注音（`rt`/`rp`）和脚本样式
pub fn reading_text(node: &Handle) -> String {
    text_content(node, RUBY_ANNOTATION_ELEMENTS)
}

fn collect_text(node: &Handle, skip: &[&str], out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            if skip.contains(&name.local.as_ref()) {
                return;
            }
            for child in node.children.borrow().iter() {
                collect_text(child, skip, out);
            }
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect_text(child, skip, out);
            }
        }
        _ => {}
    }
}
