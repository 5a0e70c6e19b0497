//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 内容单元索引约定：0 标题，1 摘要，2 起为正文块
    pub const TITLE_INDEX: usize = 0;
    pub const DESCRIPTION_INDEX: usize = 1;
    pub const BODY_INDEX_OFFSET: usize = 2;

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
    pub const DEFAULT_TARGET_LANG: &str = "vi";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    // 缓存设置
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600); // 1小时
    pub const DEFAULT_LOCAL_CACHE_SIZE: usize = 1000;

    // 本地数据
    pub const DEFAULT_HISTORY_PATH: &str = "~/.local/share/shuijiao/history.json";
    pub const DEFAULT_HSK_DATA_DIR: &str = "data/hsk";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "shuijiao.toml",
        ".shuijiao.toml",
        "~/.config/shuijiao/config.toml",
        "/etc/shuijiao/config.toml",
    ];
}
