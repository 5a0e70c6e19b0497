use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::env::EnvError;
use crate::translation::error::TranslationError;

/// Represents errors that can occur across the shuijiao library
///
/// Pipeline failures keep their own `TranslationError` type; this enum is
/// what the data loaders (stroke data, HSK lessons, history) and the CLI
/// surface to callers.
#[derive(Error, Debug)]
pub enum ShuijiaoError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 笔画数据无法解析
    #[error("笔画数据错误: {0}")]
    StrokeData(String),

    /// HSK 数据源缺失或无效
    #[error("HSK数据错误: {0}")]
    Hsk(String),

    /// 不支持的语言代码
    #[error("不支持的语言: {0}")]
    UnsupportedLanguage(String),
}

pub type ShuijiaoResult<T> = Result<T, ShuijiaoError>;

/// Language tags understood by the pipeline
///
/// Source text is either Chinese or English; translations target
/// Vietnamese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    Zh,
    En,
    Vi,
}

impl Lang {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
            Lang::Vi => "vi",
        }
    }

    /// Code expected by the Google translate endpoint
    pub fn google_code(&self) -> &'static str {
        match self {
            Lang::Zh => "zh-CN",
            Lang::En => "en",
            Lang::Vi => "vi",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = ShuijiaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" | "zh-hans" | "cn" => Ok(Lang::Zh),
            "en" => Ok(Lang::En),
            "vi" => Ok(Lang::Vi),
            other => Err(ShuijiaoError::UnsupportedLanguage(other.to_string())),
        }
    }
}
