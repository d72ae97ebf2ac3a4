// ==========================================
// 设备点检管理驾驶舱 - 传输层
// ==========================================
// 职责: 后端协作方接口定义与 REST 实现
// - HierarchySource: 层级只读接口
// - AssignmentBackend: 派工创建与列表
// 红线: 引擎只依赖 trait，URL 拼接只在 HttpBackend 内
// ==========================================

pub mod backend_trait;
pub mod context;
pub mod error;
pub mod http_backend;

// 重导出核心类型
pub use backend_trait::{AssignmentBackend, HierarchySource};
pub use context::RequestContext;
pub use error::{TransportError, TransportResult};
pub use http_backend::HttpBackend;
