//! 汉字笔画数据解析与笔顺动画
//!
//! 笔画数据有三种来源格式：结构化 JSON、SVG 路径拼接、日志转储文本。
//! 数据进入时识别一次格式并解析为统一的 [`StrokeData`]（按笔顺排列的路径字符串），
//! 之后渲染只面对这一种形状。

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::core::{ShuijiaoError, ShuijiaoResult};
use crate::parsers::html::escape_html;

/// 原始笔画数据，按格式打标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeSource {
    /// `{"strokes": [...], "character": "永"}` 或字符串数组
    Json(String),
    /// `<path d="...">` 元素序列，或直接拼接的路径数据
    Svg(String),
    /// `stroke 0: M ...` / `[0] M ...` / `0: M ...` 形式的逐行转储
    LogDump(String),
}

/// 统一的笔画数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeData {
    pub character: Option<char>,
    pub paths: Vec<String>,
}

impl StrokeSource {
    /// 识别原始数据的格式
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim_start();

        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<Value>(trimmed).is_ok()
        {
            StrokeSource::Json(raw.to_string())
        } else if trimmed.contains("<path") || trimmed.starts_with(&['M', 'm'][..]) {
            StrokeSource::Svg(raw.to_string())
        } else {
            StrokeSource::LogDump(raw.to_string())
        }
    }

    /// 解析为统一形状
    pub fn parse(&self) -> ShuijiaoResult<StrokeData> {
        let data = match self {
            StrokeSource::Json(raw) => parse_json(raw)?,
            StrokeSource::Svg(raw) => StrokeData {
                character: None,
                paths: parse_svg(raw)?,
            },
            StrokeSource::LogDump(raw) => StrokeData {
                character: None,
                paths: parse_log_dump(raw)?,
            },
        };

        if data.paths.is_empty() {
            return Err(ShuijiaoError::StrokeData("没有找到任何笔画路径".to_string()));
        }

        Ok(data)
    }
}

impl StrokeData {
    /// 识别格式并解析
    pub fn from_raw(raw: &str) -> ShuijiaoResult<Self> {
        StrokeSource::detect(raw).parse()
    }

    pub fn stroke_count(&self) -> usize {
        self.paths.len()
    }
}

fn parse_json(raw: &str) -> ShuijiaoResult<StrokeData> {
    let value: Value = serde_json::from_str(raw)?;

    let (character, strokes) = match &value {
        Value::Object(map) => {
            let character = map
                .get("character")
                .and_then(Value::as_str)
                .and_then(|s| s.chars().next());
            let strokes = map
                .get("strokes")
                .and_then(Value::as_array)
                .ok_or_else(|| ShuijiaoError::StrokeData("JSON 缺少 strokes 数组".to_string()))?;
            (character, strokes)
        }
        Value::Array(items) => (None, items),
        _ => {
            return Err(ShuijiaoError::StrokeData(
                "JSON 笔画数据必须是对象或数组".to_string(),
            ))
        }
    };

    let paths = strokes
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| ShuijiaoError::StrokeData(format!("笔画不是字符串: {}", item)))
        })
        .collect::<ShuijiaoResult<Vec<_>>>()?;

    Ok(StrokeData {
        character,
        paths: paths.into_iter().filter(|p| !p.is_empty()).collect(),
    })
}

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> ShuijiaoResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| ShuijiaoError::StrokeData(format!("正则表达式错误: {}", e)))
}

fn parse_svg(raw: &str) -> ShuijiaoResult<Vec<String>> {
    if raw.contains("<path") {
        static PATH_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
        let path_re = compiled(&PATH_RE, r#"<path\b[^>]*?\sd\s*=\s*["']([^"']*)["']"#)?;

        return Ok(path_re
            .captures_iter(raw)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect());
    }

    // 路径数据直接拼接：绝对 moveto，或闭合之后的相对 moveto 开始一笔
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut closed = false;
    for c in raw.chars() {
        let starts_stroke = c == 'M' || (c == 'm' && closed);
        if starts_stroke && !current.trim().is_empty() {
            paths.push(current.trim().to_string());
            current.clear();
        }
        if !c.is_whitespace() {
            closed = matches!(c, 'Z' | 'z');
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        paths.push(current.trim().to_string());
    }

    Ok(paths)
}

fn parse_log_dump(raw: &str) -> ShuijiaoResult<Vec<String>> {
    static LINE_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    let line_re = compiled(
        &LINE_RE,
        r"^\s*(?:stroke\s*#?\s*(\d+)\s*[:=]?|\[(\d+)\]\s*[:=]?|(\d+)\s*[:=])\s*(.+?)\s*$",
    )?;

    let mut ordered: BTreeMap<usize, String> = BTreeMap::new();

    for line in raw.lines() {
        let Some(cap) = line_re.captures(line) else {
            continue;
        };
        let index = cap
            .get(1)
            .or_else(|| cap.get(2))
            .or_else(|| cap.get(3))
            .and_then(|m| m.as_str().parse::<usize>().ok());
        let path = cap.get(4).map(|m| m.as_str().trim_matches(&['"', '\''][..]));

        if let (Some(index), Some(path)) = (index, path) {
            if path.starts_with(&['M', 'm'][..]) {
                ordered.insert(index, path.to_string());
            } else {
                tracing::debug!("忽略非路径的转储行: {}", line);
            }
        }
    }

    Ok(ordered.into_values().collect())
}

/// 动画中的一帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// 已完整绘制的笔画数
    pub completed: usize,
    /// 正在绘制的笔画及其进度（0.0..1.0）
    pub active: Option<(usize, f32)>,
}

/// 逐笔动画帧序列
#[derive(Debug, Clone)]
pub struct StrokeAnimation {
    stroke_count: usize,
    frames_per_stroke: usize,
    total_frames: usize,
    next_frame: usize,
}

impl StrokeAnimation {
    /// 帧数溢出时返回错误
    pub fn new(data: &StrokeData, frames_per_stroke: usize) -> ShuijiaoResult<Self> {
        let frames_per_stroke = frames_per_stroke.max(1);
        let total_frames = data
            .stroke_count()
            .checked_mul(frames_per_stroke)
            .and_then(|frames| frames.checked_add(1))
            .ok_or_else(|| {
                ShuijiaoError::StrokeData(format!(
                    "每笔 {} 帧过多（共 {} 笔）",
                    frames_per_stroke,
                    data.stroke_count()
                ))
            })?;

        Ok(Self {
            stroke_count: data.stroke_count(),
            frames_per_stroke,
            total_frames,
            next_frame: 0,
        })
    }

    /// 总帧数（含最后的完成帧）
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }
}

impl Iterator for StrokeAnimation {
    type Item = AnimationFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_frame >= self.total_frames {
            return None;
        }

        let frame_index = self.next_frame;
        self.next_frame += 1;

        let stroke = frame_index / self.frames_per_stroke;
        if stroke >= self.stroke_count {
            return Some(AnimationFrame {
                completed: self.stroke_count,
                active: None,
            });
        }

        let step = frame_index % self.frames_per_stroke;
        Some(AnimationFrame {
            completed: stroke,
            active: Some((stroke, step as f32 / self.frames_per_stroke as f32)),
        })
    }
}

/// SVG 输出样式
#[derive(Debug, Clone)]
pub struct SvgStyle {
    pub size: u32,
    pub view_box: String,
    /// 笔画数据坐标系的变换（默认适配 y 轴向上的 1024 网格）
    pub transform: Option<String>,
    pub outline_color: String,
    pub stroke_color: String,
    pub active_color: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            size: 256,
            view_box: "0 0 1024 1024".to_string(),
            transform: Some("scale(1, -1) translate(0, -900)".to_string()),
            outline_color: "#DDD".to_string(),
            stroke_color: "#333".to_string(),
            active_color: "#C0392B".to_string(),
        }
    }
}

/// 渲染某一帧的 SVG
pub fn render_svg(data: &StrokeData, frame: &AnimationFrame, style: &SvgStyle) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="{1}">"#,
        style.size,
        escape_html(&style.view_box)
    );
    match &style.transform {
        Some(transform) => {
            let _ = write!(svg, r#"<g transform="{}">"#, escape_html(transform));
        }
        None => svg.push_str("<g>"),
    }

    for (i, path) in data.paths.iter().enumerate() {
        let d = escape_html(path);
        if i < frame.completed {
            let _ = write!(svg, r#"<path d="{}" fill="{}"/>"#, d, style.stroke_color);
        } else if let Some((active, progress)) = frame.active.filter(|(a, _)| *a == i) {
            let offset = (1.0 - progress).clamp(0.0, 1.0);
            let _ = write!(
                svg,
                r#"<path d="{}" fill="{}"/><path d="{}" fill="none" stroke="{}" stroke-width="64" pathLength="1" stroke-dasharray="1" stroke-dashoffset="{:.3}" data-stroke="{}"/>"#,
                d, style.outline_color, d, style.active_color, offset, active
            );
        } else {
            let _ = write!(svg, r#"<path d="{}" fill="{}"/>"#, d, style.outline_color);
        }
    }

    svg.push_str("</g></svg>");
    svg
}
