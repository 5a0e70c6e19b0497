//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，配置管理器在加载配置文件后用它做覆盖

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 仅在变量被显式设置时返回值
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "SHUIJIAO_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 翻译相关环境变量
pub mod translation {
    use super::*;

    /// 目标语言
    pub struct TargetLang;
    impl EnvVar<String> for TargetLang {
        const NAME: &'static str = "SHUIJIAO_TARGET_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Target language for translation (ISO 639-1 code)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("vi".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim().to_lowercase();
            if lang.len() != 2 {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Language code must be 2 characters (ISO 639-1)".to_string(),
                });
            }
            Ok(lang)
        }
    }

    /// 逐段翻译接口地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "SHUIJIAO_TRANSLATE_API_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Per-unit translation endpoint (Google translate compatible)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(crate::translation::config::constants::DEFAULT_API_URL.to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 预翻译缓存服务地址
    pub struct ContentCacheUrl;
    impl EnvVar<String> for ContentCacheUrl {
        const NAME: &'static str = "SHUIJIAO_CONTENT_CACHE_URL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Base URL of the pre-computed translation cache (optional)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_http_url(value, Self::NAME)
        }
    }

    /// 单次请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "SHUIJIAO_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(15));
        const DESCRIPTION: &'static str = "Per-request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let secs = parse_positive_usize(value, Self::NAME, 1, 300)?;
            Ok(Duration::from_secs(secs as u64))
        }
    }
}

/// 缓存相关环境变量
pub mod cache {
    use super::*;

    /// 缓存启用状态
    pub struct Enabled;
    impl EnvVar<bool> for Enabled {
        const NAME: &'static str = "SHUIJIAO_CACHE_ENABLED";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Enable the in-memory translation cache";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 缓存容量
    pub struct Size;
    impl EnvVar<usize> for Size {
        const NAME: &'static str = "SHUIJIAO_CACHE_SIZE";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str = "Maximum number of cached unit translations";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }

    /// 缓存生存时间
    pub struct Ttl;
    impl EnvVar<Duration> for Ttl {
        const NAME: &'static str = "SHUIJIAO_CACHE_TTL";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(3600));
        const DESCRIPTION: &'static str = "Cache entry time-to-live in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let secs = parse_positive_usize(value, Self::NAME, 1, 7 * 24 * 3600)?;
            Ok(Duration::from_secs(secs as u64))
        }
    }
}

/// 本地数据相关环境变量
pub mod data {
    use super::*;

    /// 查词历史文件
    pub struct HistoryPath;
    impl EnvVar<String> for HistoryPath {
        const NAME: &'static str = "SHUIJIAO_HISTORY_PATH";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path of the dictionary lookup history file";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("~/.local/share/shuijiao/history.json".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }

    /// HSK 数据目录
    pub struct HskDataDir;
    impl EnvVar<String> for HskDataDir {
        const NAME: &'static str = "SHUIJIAO_HSK_DATA_DIR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Directory holding hsk<level>.json lesson files";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("data/hsk".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            parse_non_empty(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_http_url(value: &str, var_name: &str) -> EnvResult<String> {
    let parsed = url::Url::parse(value.trim()).map_err(|e| EnvError {
        variable: var_name.to_string(),
        message: format!("Invalid URL '{}': {}", value, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(value.trim().trim_end_matches('/').to_string()),
        scheme => Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Unsupported URL scheme '{}'. Use http or https", scheme),
        }),
    }
}

fn parse_non_empty(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn doc_line<T: fmt::Debug>(name: &str, description: &str, default: Option<T>) -> String {
    format!("- `{}`: {} (default: {:?})\n", name, description, default)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&doc_line(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, Some("info")));
    docs.push_str(&doc_line(core::NoColor::NAME, core::NoColor::DESCRIPTION, core::NoColor::DEFAULT));

    docs.push_str("\n## Translation Configuration\n\n");
    docs.push_str(&doc_line(
        translation::TargetLang::NAME,
        translation::TargetLang::DESCRIPTION,
        Some("vi"),
    ));
    docs.push_str(&doc_line(
        translation::ApiUrl::NAME,
        translation::ApiUrl::DESCRIPTION,
        Some(crate::translation::config::constants::DEFAULT_API_URL),
    ));
    docs.push_str(&doc_line(
        translation::ContentCacheUrl::NAME,
        translation::ContentCacheUrl::DESCRIPTION,
        translation::ContentCacheUrl::DEFAULT,
    ));
    docs.push_str(&doc_line(
        translation::RequestTimeout::NAME,
        translation::RequestTimeout::DESCRIPTION,
        translation::RequestTimeout::DEFAULT,
    ));

    docs.push_str("\n## Cache Configuration\n\n");
    docs.push_str(&doc_line(cache::Enabled::NAME, cache::Enabled::DESCRIPTION, cache::Enabled::DEFAULT));
    docs.push_str(&doc_line(cache::Size::NAME, cache::Size::DESCRIPTION, cache::Size::DEFAULT));
    docs.push_str(&doc_line(cache::Ttl::NAME, cache::Ttl::DESCRIPTION, cache::Ttl::DEFAULT));

    docs.push_str("\n## Data Files\n\n");
    docs.push_str(&doc_line(
        data::HistoryPath::NAME,
        data::HistoryPath::DESCRIPTION,
        Some("~/.local/share/shuijiao/history.json"),
    ));
    docs.push_str(&doc_line(
        data::HskDataDir::NAME,
        data::HskDataDir::DESCRIPTION,
        Some("data/hsk"),
    ));

    docs
}
