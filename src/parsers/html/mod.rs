//! HTML解析和处理模块
//!
//! - `utils`: 基础常量和转义
//! - `dom`: 片段解析、节点查询、文本提取
//! - `serializer`: 节点序列化

pub mod dom;
pub mod serializer;
pub mod utils;

pub use dom::{
    decode_bytes, fragment_to_dom, get_body_node, get_child_node_by_name, get_node_name,
    is_blank_text, reading_text, text_content,
};
pub use serializer::serialize_node;
pub use utils::{escape_html, RUBY_ANNOTATION_ELEMENTS, WHITESPACES};
