// ==========================================
// 设备点检管理驾驶舱 - 核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest
// 系统定位: 四级设备层级浏览、级联勾选、批量派工、派工视图
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 传输层 - 后端协作方接口
pub mod transport;

// 引擎层 - 层级缓存 / 勾选 / 批量派工 / 分组排序
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssignmentStatus, AssignmentType, NodeKind, Priority, SelectionState};

// 领域实体
pub use domain::{
    AssignmentRecord, AssignmentTemplate, FanoutResult, HierarchyEntry, HierarchyNode,
    LeafFailure, NodeKey,
};

// 引擎
pub use engine::{
    BulkFanoutExecutor, CascadingSelectionModel, GroupDimension, GroupingSortEngine,
    HierarchyStore, SortDirection, SortKey,
};

// API
pub use api::{ApiError, ApiResult, AssignmentApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备点检管理驾驶舱";
