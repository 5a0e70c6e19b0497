//! HSK 课程数据
//!
//! 每个等级对应一个显式登记的数据源，启动时一次性加载并校验，
//! 之后按等级和课程 id 查询。

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{ShuijiaoError, ShuijiaoResult};

/// HSK 等级（1 到 6）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HskLevel(u8);

impl HskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> ShuijiaoResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ShuijiaoError::Hsk(format!(
                "等级 {} 超出范围 {}..={}",
                level,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = HskLevel> {
        (Self::MIN..=Self::MAX).map(HskLevel)
    }

    /// 数据目录下的约定文件名
    pub fn file_name(&self) -> String {
        format!("hsk{}.json", self.0)
    }
}

impl fmt::Display for HskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HSK {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HskWord {
    pub hanzi: String,
    pub pinyin: String,
    pub meaning: String,
    /// 汉越音
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub han_viet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HskLesson {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub words: Vec<HskWord>,
}

/// 等级数据源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HskSource {
    File(PathBuf),
    Inline(String),
}

impl HskSource {
    fn load(&self) -> ShuijiaoResult<Vec<HskLesson>> {
        let raw = match self {
            HskSource::File(path) => fs::read_to_string(path)
                .map_err(|e| ShuijiaoError::Hsk(format!("无法读取 {}: {}", path.display(), e)))?,
            HskSource::Inline(raw) => raw.clone(),
        };

        serde_json::from_str(&raw)
            .map_err(|e| ShuijiaoError::Hsk(format!("{} 不是有效的课程数据: {}", self, e)))
    }
}

impl fmt::Display for HskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HskSource::File(path) => write!(f, "{}", path.display()),
            HskSource::Inline(_) => write!(f, "<inline>"),
        }
    }
}

/// 登记数据源，`build` 时统一加载
#[derive(Debug, Default)]
pub struct HskRegistryBuilder {
    sources: BTreeMap<HskLevel, HskSource>,
}

impl HskRegistryBuilder {
    pub fn register(mut self, level: HskLevel, source: HskSource) -> Self {
        if let Some(previous) = self.sources.insert(level, source) {
            tracing::warn!("{} 的数据源被覆盖: {}", level, previous);
        }
        self
    }

    pub fn build(self) -> ShuijiaoResult<HskRegistry> {
        let mut levels = BTreeMap::new();

        for (level, source) in self.sources {
            let lessons = source.load()?;

            let mut seen = HashSet::new();
            for lesson in &lessons {
                if !seen.insert(lesson.id) {
                    return Err(ShuijiaoError::Hsk(format!(
                        "{} 中课程 id {} 重复",
                        source, lesson.id
                    )));
                }
            }

            tracing::debug!("{}: 加载 {} 课", level, lessons.len());
            levels.insert(level, lessons);
        }

        Ok(HskRegistry { levels })
    }
}

/// 已加载的 HSK 课程
#[derive(Debug, Clone, Default)]
pub struct HskRegistry {
    levels: BTreeMap<HskLevel, Vec<HskLesson>>,
}

impl HskRegistry {
    pub fn builder() -> HskRegistryBuilder {
        HskRegistryBuilder::default()
    }

    /// 登记目录中存在的 `hsk{n}.json`
    pub fn from_dir(dir: &Path) -> ShuijiaoResult<Self> {
        if !dir.is_dir() {
            return Err(ShuijiaoError::Hsk(format!("数据目录不存在: {}", dir.display())));
        }

        let builder = HskLevel::all().fold(Self::builder(), |builder, level| {
            let path = dir.join(level.file_name());
            if path.is_file() {
                builder.register(level, HskSource::File(path))
            } else {
                builder
            }
        });
        builder.build()
    }

    pub fn levels(&self) -> impl Iterator<Item = HskLevel> + '_ {
        self.levels.keys().copied()
    }

    pub fn lessons(&self, level: HskLevel) -> Option<&[HskLesson]> {
        self.levels.get(&level).map(Vec::as_slice)
    }

    pub fn lesson(&self, level: HskLevel, id: u32) -> Option<&HskLesson> {
        self.lessons(level)?.iter().find(|lesson| lesson.id == id)
    }
}
