// 配置管理模块

use crate::error::{Result as SdkResult, SdkError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

/// SDK 配置（对应 config/app.toml）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdkConfig {
    /// 主 API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 存储容器配置（未配置时存储相关命令不可用）
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 主 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 根地址（末尾的 `/` 会被去掉）
    #[serde(default)]
    pub base_url: String,
    /// API Key（可选，配置后随每个请求发送 x-api-key 头）
    #[serde(default)]
    pub api_key: Option<String>,
    /// 单个请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// 任务轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 任务等待超时（毫秒）
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("mediahub-sdk/{}", env!("CARGO_PKG_VERSION"))
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_ms() -> u64 {
    60_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// 去掉末尾斜杠后的根地址
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim().trim_end_matches('/').to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 校验必填字段
    pub fn validate(&self) -> SdkResult<()> {
        if self.normalized_base_url().is_empty() {
            return Err(SdkError::Config("base_url 不能为空".to_string()));
        }
        Ok(())
    }
}

/// 存储容器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 存储服务根地址
    #[serde(default)]
    pub base_url: String,
    /// 容器 ID
    #[serde(default)]
    pub container_id: String,
    /// 容器访问令牌
    #[serde(default)]
    pub token: String,
    /// 单个请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StorageConfig {
    pub fn new(
        base_url: impl Into<String>,
        container_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            container_id: container_id.into(),
            token: token.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// 校验必填字段，三者缺一不可
    pub fn validate(&self) -> SdkResult<()> {
        let missing: Vec<&str> = [
            ("base_url", self.base_url.trim_end_matches('/')),
            ("container_id", self.container_id.as_str()),
            ("token", self.token.as_str()),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();

        if !missing.is_empty() {
            return Err(SdkError::Config(format!(
                "存储配置缺少必填字段: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default)]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 单个日志文件最大大小（字节，默认 20MB）
    #[serde(default = "default_log_max_file_size")]
    pub max_file_size: u64,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_file_size() -> u64 {
    20 * 1024 * 1024
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
            max_file_size: default_log_max_file_size(),
        }
    }
}

impl SdkConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: SdkConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        tracing::info!("配置已保存: {:?}", path);
        Ok(())
    }

    /// 加载配置，文件不存在或解析失败时使用默认配置
    pub async fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::debug!("配置文件加载成功: {:?}", path);
                config
            }
            Err(e) => {
                tracing::debug!("配置文件加载失败，使用默认配置: {:#}", e);
                Self::default()
            }
        }
    }

    /// 用环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// 用给定的变量查询函数覆盖配置
    ///
    /// 空字符串视为未设置
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("MEDIAHUB_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = get("MEDIAHUB_API_KEY") {
            self.api.api_key = Some(key);
        }

        let storage_url = get("MEDIAHUB_STORAGE_URL");
        let container = get("MEDIAHUB_STORAGE_CONTAINER");
        let token = get("MEDIAHUB_STORAGE_TOKEN");
        if storage_url.is_some() || container.is_some() || token.is_some() {
            let storage = self.storage.get_or_insert_with(|| StorageConfig {
                timeout_secs: default_timeout_secs(),
                ..Default::default()
            });
            if let Some(url) = storage_url {
                storage.base_url = url;
            }
            if let Some(id) = container {
                storage.container_id = id;
            }
            if let Some(token) = token {
                storage.token = token;
            }
        }
    }
}
