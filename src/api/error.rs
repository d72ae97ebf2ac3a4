// ==========================================
// 设备点检管理驾驶舱 - API层错误类型
// ==========================================
// 职责: 把引擎/传输/配置错误转换为面向用户的错误消息
// 约定: 后端返回的 detail 原样透传，不改写
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{EngineError, LoadError};
use crate::transport::error::TransportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 后端错误
    // ==========================================
    /// 层级加载失败（节点 + 原因）
    #[error("加载失败: node={node}, {detail}")]
    LoadFailed {
        node: String,
        status: Option<u16>,
        detail: String,
    },

    /// 后端返回非 2xx
    #[error("后端返回错误: status={status}, {detail}")]
    BackendRejected { status: u16, detail: String },

    #[error("网络错误: {0}")]
    NetworkError(String),

    #[error("响应解析失败: {0}")]
    DecodeError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误码，供界面层分支处理
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::ValidationError(_) => "VALIDATION_FAILED",
            ApiError::LoadFailed { .. } => "LOAD_FAILED",
            ApiError::BackendRejected { .. } => "BACKEND_REJECTED",
            ApiError::NetworkError(_) => "NETWORK_ERROR",
            ApiError::DecodeError(_) => "DECODE_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::Other(_) => "UNKNOWN",
        }
    }
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, detail } => {
                ApiError::BackendRejected { status, detail }
            }
            TransportError::Network(msg) => ApiError::NetworkError(msg),
            TransportError::Decode(msg) => ApiError::DecodeError(msg),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::LoadFailure(load) => ApiError::LoadFailed {
                node: load.node.to_string(),
                status: load.status(),
                detail: load.source.detail(),
            },
            EngineError::ValidationFailure(msg) => ApiError::ValidationError(msg),
        }
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        EngineError::from(err).into()
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
