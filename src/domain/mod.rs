// ==========================================
// 设备点检管理驾驶舱 - 领域模型层
// ==========================================
// 职责: 定义层级节点、派工实体与领域枚举
// 红线: 不含网络访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod hierarchy;
pub mod types;

// 重导出核心类型
pub use assignment::{
    AssignmentRecord, AssignmentTemplate, CreateAssignmentRequest, CreatedAssignment,
    FanoutResult, LeafFailure,
};
pub use hierarchy::{HierarchyEntry, HierarchyNode, NodeKey};
pub use types::{AssignmentStatus, AssignmentType, NodeKind, Priority, SelectionState};
