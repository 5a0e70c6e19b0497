use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};

use super::dom::text_content;
use super::utils::escape_html;

/// 序列化单个节点（包含节点自身）为 HTML 标记
///
/// 文本节点按转义后的文本输出；序列化失败时退化为节点的纯文本。
pub fn serialize_node(node: &Handle) -> String {
    if let NodeData::Text { contents } = &node.data {
        return escape_html(&contents.borrow());
    }

    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    match serialize(&mut buf, &serializable, opts) {
        Ok(()) => String::from_utf8_lossy(&buf).to_string(),
        Err(e) => {
            tracing::warn!("节点序列化失败，退化为纯文本: {}", e);
            escape_html(&text_content(node, &[]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{fragment_to_dom, get_body_node};

    #[test]
    fn test_serialize_keeps_inner_formatting() {
        let dom = fragment_to_dom("<p class=\"lead\">Hello <b>world</b></p>");
        let body = get_body_node(&dom).unwrap();
        let p = body.children.borrow()[0].clone();
        assert_eq!(serialize_node(&p), "<p class=\"lead\">Hello <b>world</b></p>");
    }

    #[test]
    fn test_serialize_text_node_escapes() {
        let dom = fragment_to_dom("a &lt; b");
        let body = get_body_node(&dom).unwrap();
        let text = body.children.borrow()[0].clone();
        assert_eq!(serialize_node(&text), "a &lt; b");
    }
}
