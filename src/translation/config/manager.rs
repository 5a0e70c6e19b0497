//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::core::Lang;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 基础配置
    pub target_lang: String,
    pub api_url: String,
    /// 预翻译缓存服务地址，未配置时只走逐段翻译
    pub content_cache_url: Option<String>,
    pub request_timeout_secs: u64,

    // 缓存配置
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub local_cache_size: usize,

    // 本地数据
    pub history_path: String,
    pub hsk_data_dir: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            api_url: constants::DEFAULT_API_URL.to_string(),
            content_cache_url: None,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            cache_enabled: true,
            cache_ttl_secs: constants::DEFAULT_CACHE_TTL.as_secs(),
            local_cache_size: constants::DEFAULT_LOCAL_CACHE_SIZE,

            history_path: constants::DEFAULT_HISTORY_PATH.to_string(),
            hsk_data_dir: constants::DEFAULT_HSK_DATA_DIR.to_string(),
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }
        self.target_lang
            .parse::<Lang>()
            .map_err(|e| TranslationError::ConfigError(format!("target_lang 无效: {}", e)))?;

        for (name, value) in [
            ("api_url", Some(&self.api_url)),
            ("content_cache_url", self.content_cache_url.as_ref()),
        ] {
            if let Some(value) = value {
                let parsed = url::Url::parse(value).map_err(|e| {
                    TranslationError::ConfigError(format!("{} 无效 '{}': {}", name, value, e))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(TranslationError::ConfigError(format!(
                        "{} 只支持 http/https: {}",
                        name, value
                    )));
                }
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        if self.cache_enabled && self.local_cache_size == 0 {
            return Err(TranslationError::ConfigError("启用缓存时缓存大小不能为0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖（只覆盖显式设置的变量）
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{cache, data, translation, EnvVar};

        fn apply<T>(slot: &mut T, value: Option<crate::env::EnvResult<T>>) {
            match value {
                Some(Ok(v)) => *slot = v,
                Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
                None => {}
            }
        }

        apply(&mut self.target_lang, translation::TargetLang::get_set());
        apply(&mut self.api_url, translation::ApiUrl::get_set());

        match translation::ContentCacheUrl::get_set() {
            Some(Ok(url)) => self.content_cache_url = Some(url),
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        let mut timeout = self.request_timeout();
        apply(&mut timeout, translation::RequestTimeout::get_set());
        self.request_timeout_secs = timeout.as_secs();

        apply(&mut self.cache_enabled, cache::Enabled::get_set());
        apply(&mut self.local_cache_size, cache::Size::get_set());

        let mut ttl = self.cache_ttl();
        apply(&mut ttl, cache::Ttl::get_set());
        self.cache_ttl_secs = ttl.as_secs();

        apply(&mut self.history_path, data::HistoryPath::get_set());
        apply(&mut self.hsk_data_dir, data::HskDataDir::get_set());
    }

    /// 转换为Duration类型
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// 展开 `~` 后的历史文件路径
    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.history_path).as_ref())
    }

    /// 展开 `~` 后的 HSK 数据目录
    pub fn hsk_data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.hsk_data_dir).as_ref())
    }
}

/// 简化的配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建新的配置管理器：.env → 配置文件 → 环境变量覆盖 → 验证
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let source = constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists());

        let mut config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                TranslationConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 从指定文件创建配置管理器
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
