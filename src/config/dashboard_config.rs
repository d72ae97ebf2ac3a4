// ==========================================
// 设备点检管理驾驶舱 - 配置加载
// ==========================================
// 加载顺序: 默认值 → JSON 配置文件 → 环境变量覆写
// 配置文件: $INSPECTION_DASHBOARD_CONFIG，否则
//           <用户配置目录>/inspection-dashboard/config.json（存在时）
// 说明: 会话令牌不属于配置，由认证协作方注入 RequestContext
// ==========================================

use crate::transport::context::RequestContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ==========================================
// 配置键（环境变量）
// ==========================================
pub mod config_keys {
    pub const CONFIG_PATH: &str = "INSPECTION_DASHBOARD_CONFIG";
    pub const API_BASE_URL: &str = "INSPECTION_API_BASE_URL";
    pub const FANOUT_CONCURRENCY: &str = "INSPECTION_FANOUT_CONCURRENCY";
    pub const REQUEST_TIMEOUT_SECS: &str = "INSPECTION_REQUEST_TIMEOUT_SECS";
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: path={path}, {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("配置文件解析失败: path={path}, {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("配置项无效: {0}")]
    Invalid(String),
}

// ==========================================
// DashboardConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 后端根地址
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 批量派工并发上限
    pub fanout_concurrency: usize,
    /// 默认日志过滤（RUST_LOG 优先）
    pub log_filter: String,
    /// 是否输出 JSON 日志
    pub json_logs: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout_secs: 30,
            fanout_concurrency: 8,
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl DashboardConfig {
    /// 从默认位置和进程环境变量加载
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let path = env(config_keys::CONFIG_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| default_config_path().filter(|p| p.exists()));

        Self::load_with(path.as_deref(), env)
    }

    /// 从指定文件和环境变量查找函数加载
    ///
    /// # 参数
    /// - path: 配置文件路径（None 表示只用默认值）
    /// - env: 环境变量查找函数
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// 读取 JSON 配置文件（缺失字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 环境变量覆写
    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env(config_keys::API_BASE_URL) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = env(config_keys::FANOUT_CONCURRENCY) {
            self.fanout_concurrency = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{}={} 不是正整数", config_keys::FANOUT_CONCURRENCY, raw))
            })?;
        }
        if let Some(raw) = env(config_keys::REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{}={} 不是正整数",
                    config_keys::REQUEST_TIMEOUT_SECS,
                    raw
                ))
            })?;
        }
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api_base_url 不能为空".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url 必须以 http:// 或 https:// 开头: {}",
                url
            )));
        }
        if self.fanout_concurrency == 0 {
            return Err(ConfigError::Invalid("fanout_concurrency 必须 >= 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs 必须 >= 1".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 构造请求上下文（不含令牌）
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.api_base_url.clone()).with_timeout(self.request_timeout())
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("inspection-dashboard").join("config.json"))
}
