// ==========================================
// 设备点检管理驾驶舱 - 引擎层错误类型
// ==========================================
// 分类:
// - LoadFailure: 层级子节点加载失败，节点保持未加载（可重试）
// - ValidationFailure: 调用前置条件不满足，未发起任何网络请求
// 部分失败/全部失败不是错误，以 FanoutResult 返回
// ==========================================

use crate::domain::hierarchy::NodeKey;
use crate::transport::error::TransportError;
use thiserror::Error;

/// 层级加载失败详情
///
/// 需要 Clone: 同一节点的在途请求结果会分发给所有等待者
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("层级加载失败: node={node}, {source}")]
pub struct LoadError {
    pub node: NodeKey,
    pub source: TransportError,
}

impl LoadError {
    pub fn new(node: NodeKey, source: TransportError) -> Self {
        Self { node, source }
    }

    pub fn status(&self) -> Option<u16> {
        self.source.status()
    }
}

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    LoadFailure(#[from] LoadError),

    #[error("校验失败: {0}")]
    ValidationFailure(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
