//! # 解析器模块
//!
//! 这个模块包含所有与输入内容解析相关的功能：
//!
//! - `html` - HTML片段解析、块元素提取、序列化
//! - `text` - 中英文句子切分
//! - `stroke` - 汉字笔画数据解析与笔顺动画

pub mod html;
pub mod stroke;
pub mod text;

// Re-export commonly used items for convenience
pub use html::{fragment_to_dom, get_body_node, reading_text, serialize_node};
pub use stroke::{AnimationFrame, StrokeAnimation, StrokeData, StrokeSource, SvgStyle};
pub use text::{split_sentences, strip_annotations};
