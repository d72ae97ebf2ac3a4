// ==========================================
// 设备点检管理驾驶舱 - 后端协作方 Trait
// ==========================================
// 职责: 定义核心引擎所需的后端读写接口（不包含实现）
// 实现者: HttpBackend（REST）；测试中为内存假后端
// ==========================================

use crate::domain::assignment::{AssignmentRecord, CreateAssignmentRequest, CreatedAssignment};
use crate::domain::hierarchy::HierarchyEntry;
use crate::transport::error::TransportResult;
use async_trait::async_trait;

// ==========================================
// HierarchySource Trait
// ==========================================
// 用途: 层级只读接口，仅 HierarchyStore 调用
#[async_trait]
pub trait HierarchySource: Send + Sync {
    /// 企业列表
    async fn list_enterprises(&self) -> TransportResult<Vec<HierarchyEntry>>;

    /// 企业下的分公司列表
    async fn list_branches(&self, enterprise_id: &str) -> TransportResult<Vec<HierarchyEntry>>;

    /// 分公司下的车间列表
    async fn list_workshops(&self, branch_id: &str) -> TransportResult<Vec<HierarchyEntry>>;

    /// 车间下的设备列表
    async fn list_equipment(&self, workshop_id: &str) -> TransportResult<Vec<HierarchyEntry>>;
}

// ==========================================
// AssignmentBackend Trait
// ==========================================
// 用途: 派工创建（写）与派工列表（读）
#[async_trait]
pub trait AssignmentBackend: Send + Sync {
    /// 创建单条派工
    ///
    /// # 返回
    /// - Ok(Some(CreatedAssignment)): 2xx，响应体带新记录ID
    /// - Ok(None): 2xx，响应体为空或无法识别（仍算创建成功）
    /// - Err(TransportError::Status): 非 2xx，detail 为后端原文
    async fn create_assignment(
        &self,
        request: &CreateAssignmentRequest,
    ) -> TransportResult<Option<CreatedAssignment>>;

    /// 派工记录全集（分组/排序视图的数据源）
    async fn list_assignments(&self) -> TransportResult<Vec<AssignmentRecord>>;
}
