// ==========================================
// 设备点检管理驾驶舱 - 传输层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: Clone 是必需的，同一次在途请求的结果要分发给所有等待者
// ==========================================

use thiserror::Error;

/// 传输层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// 后端返回非 2xx
    #[error("后端返回错误: status={status}, detail={detail}")]
    Status { status: u16, detail: String },

    /// 请求未得到响应（连接失败、超时等）
    #[error("网络错误: {0}")]
    Network(String),

    /// 响应体无法解析
    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP 状态码（无响应时为 None）
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 面向用户的错误详情
    ///
    /// 后端的 `detail` 原样透传；其余错误使用错误描述
    pub fn detail(&self) -> String {
        match self {
            TransportError::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
                detail: err.to_string(),
            }
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Result 类型别名
pub type TransportResult<T> = Result<T, TransportError>;
