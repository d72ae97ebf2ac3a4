// ==========================================
// 设备点检管理驾驶舱 - 引擎层
// ==========================================
// 组件（自底向上）:
// - HierarchyStore: 四级树懒加载缓存，唯一访问层级接口的组件
// - CascadingSelectionModel: 设备选中集合 + 祖先三态推导
// - BulkFanoutExecutor: 按选中设备批量创建派工
// - GroupingSortEngine: 派工记录分组/排序（与前三者独立）
// ==========================================
// 红线: 引擎只依赖传输层 trait，不拼 URL
// ==========================================

pub mod error;
pub mod fanout;
pub mod grouping;
pub mod hierarchy_store;
pub mod selection;

// 重导出核心引擎
pub use error::{EngineError, EngineResult, LoadError};
pub use fanout::{BulkFanoutExecutor, DEFAULT_FANOUT_CONCURRENCY};
pub use grouping::{
    AssignmentGroup, BucketKey, GroupDimension, GroupingSortEngine, Sentinel, SortDirection,
    SortKey,
};
pub use hierarchy_store::{ChildList, HierarchySnapshot, HierarchyStore, LoadState};
pub use selection::{derive_selection_state, CascadingSelectionModel};
