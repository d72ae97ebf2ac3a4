// ==========================================
// 设备点检管理驾驶舱 - 派工 API
// ==========================================
// 职责: 供界面命令层调用的会话门面
// - 层级树展开（子节点 + 三态 + 加载状态）
// - 设备勾选 / 子树勾选
// - 按选中设备批量派工、失败部分重试
// - 派工记录分组/排序视图
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_template;
use crate::domain::assignment::{AssignmentRecord, AssignmentTemplate, FanoutResult};
use crate::domain::hierarchy::{HierarchyNode, NodeKey};
use crate::domain::types::{NodeKind, SelectionState};
use crate::engine::fanout::BulkFanoutExecutor;
use crate::engine::grouping::{
    AssignmentGroup, GroupDimension, GroupingSortEngine, SortDirection, SortKey,
};
use crate::engine::hierarchy_store::{HierarchySnapshot, HierarchyStore, LoadState};
use crate::engine::selection::{derive_selection_state, CascadingSelectionModel};
use crate::transport::backend_trait::AssignmentBackend;

// ==========================================
// TreeNodeView - 树行视图
// ==========================================

/// 层级树中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNodeView {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub name: String,
    pub code: Option<String>,
    pub is_leaf: bool,
    /// 勾选三态（未完整加载的子树最多为 PARTIAL）
    pub selection: SelectionState,
    /// 子节点加载状态（设备恒为 LOADED）
    pub load_state: LoadState,
}

// ==========================================
// AssignmentApi - 派工 API
// ==========================================

/// 派工API
///
/// 一个实例对应一个用户会话：选中集合属于会话，层级缓存随会话丢弃。
pub struct AssignmentApi {
    store: Arc<HierarchyStore>,
    selection: Mutex<CascadingSelectionModel>,
    executor: BulkFanoutExecutor,
    backend: Arc<dyn AssignmentBackend>,
    grouping: GroupingSortEngine,
}

impl AssignmentApi {
    /// 创建新的AssignmentApi实例
    pub fn new(
        store: Arc<HierarchyStore>,
        backend: Arc<dyn AssignmentBackend>,
        fanout_concurrency: usize,
    ) -> Self {
        Self {
            selection: Mutex::new(CascadingSelectionModel::new(store.clone())),
            executor: BulkFanoutExecutor::new(backend.clone(), fanout_concurrency),
            store,
            backend,
            grouping: GroupingSortEngine::new(),
        }
    }

    pub fn store(&self) -> &Arc<HierarchyStore> {
        &self.store
    }

    // ==========================================
    // 层级树
    // ==========================================

    /// 展开节点，返回子节点行
    ///
    /// # 参数
    /// - parent: 父节点（NodeKey::Root 为企业列表）
    ///
    /// # 返回
    /// - Ok(Vec<TreeNodeView>): 按后端顺序的子节点行
    /// - Err(ApiError::LoadFailed): 加载失败，节点可重试
    pub async fn load_children(&self, parent: &NodeKey) -> ApiResult<Vec<TreeNodeView>> {
        let children = self.store.get_children(parent).await?;

        let selection = self.selection.lock().await;
        let snapshot = self.store.snapshot();
        Ok(children
            .iter()
            .filter_map(|node| self.row(node, &snapshot, &selection))
            .collect())
    }

    /// 作废节点缓存（用户手动刷新）
    pub fn refresh(&self, key: &NodeKey) -> usize {
        let removed = self.store.invalidate(key);
        info!(node = %key, removed, "层级缓存已作废");
        removed
    }

    // ==========================================
    // 勾选
    // ==========================================

    /// 切换单台设备
    ///
    /// # 返回
    /// - Ok(bool): 切换后是否选中
    pub async fn toggle_equipment(&self, equipment_id: &str) -> ApiResult<bool> {
        if equipment_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("设备ID不能为空".to_string()));
        }
        Ok(self.selection.lock().await.toggle_leaf(equipment_id))
    }

    /// 勾选/取消整棵子树
    ///
    /// # 返回
    /// - Ok(usize): 子树中的设备数
    /// - Err(ApiError::LoadFailed): 某层加载失败，选中集合未修改
    pub async fn set_subtree(&self, key: &NodeKey, checked: bool) -> ApiResult<usize> {
        if *key == NodeKey::Root {
            return Err(ApiError::InvalidInput("不支持对根节点整体勾选".to_string()));
        }
        let mut selection = self.selection.lock().await;
        Ok(selection.set_subtree(key, checked).await?)
    }

    pub async fn selection_count(&self) -> usize {
        self.selection.lock().await.len()
    }

    pub async fn selected_ids(&self) -> Vec<String> {
        self.selection.lock().await.selected_ids()
    }

    /// 批量查询三态
    pub async fn selection_states(&self, keys: &[NodeKey]) -> Vec<SelectionState> {
        self.selection.lock().await.states_of(keys)
    }

    pub async fn clear_selection(&self) {
        self.selection.lock().await.clear();
    }

    // ==========================================
    // 批量派工
    // ==========================================

    /// 按当前选中设备批量创建派工
    ///
    /// 全部成功时从选中集合移除已提交的设备；部分失败时选中集合保持不变，
    /// 调用方可用 `retry_failed` 重试失败部分。
    ///
    /// # 返回
    /// - Ok(FanoutResult): 汇总结果（部分/全部失败也在这里）
    /// - Err(ApiError::InvalidInput): 模板校验失败
    /// - Err(ApiError::ValidationError): 未选择设备
    pub async fn create_for_selection(
        &self,
        template: &AssignmentTemplate,
    ) -> ApiResult<FanoutResult> {
        validate_template(template)?;

        let ids = self.selection.lock().await.selected_ids();
        let result = self.executor.execute(&ids, template).await?;
        self.settle(&result).await;
        Ok(result)
    }

    /// 只对上一次的失败设备重新发起
    ///
    /// 重试全部成功时，上一次成功的设备也从选中集合移除。
    ///
    /// # 返回
    /// - Err(ApiError::ValidationError): 上一次没有失败设备
    pub async fn retry_failed(
        &self,
        previous: &FanoutResult,
        template: &AssignmentTemplate,
    ) -> ApiResult<FanoutResult> {
        validate_template(template)?;

        let failed = previous.failed_ids();
        if failed.is_empty() {
            return Err(ApiError::ValidationError("没有需要重试的设备".to_string()));
        }

        info!(count = failed.len(), "重试失败设备");
        let result = self.executor.execute(&failed, template).await?;
        self.settle(&result).await;
        if result.is_total_success() {
            // 整批至此全部创建，上一次成功的部分一并移出选中集合
            self.selection.lock().await.remove_all(&previous.succeeded);
        }
        Ok(result)
    }

    async fn settle(&self, result: &FanoutResult) {
        if result.is_total_success() {
            self.selection.lock().await.remove_all(&result.succeeded);
        } else {
            warn!(
                failed = result.failed_count,
                first_error = result.first_error.as_deref().unwrap_or(""),
                "批量派工部分失败，保留选中集合"
            );
        }
    }

    // ==========================================
    // 派工记录视图
    // ==========================================

    /// 拉取派工记录并排序
    pub async fn list_assignments(
        &self,
        key: SortKey,
        direction: SortDirection,
    ) -> ApiResult<Vec<AssignmentRecord>> {
        let records = self.backend.list_assignments().await?;
        Ok(self.grouping.sort_by(records, key, direction))
    }

    /// 拉取派工记录 → 排序 → 分组
    pub async fn list_grouped(
        &self,
        dimension: GroupDimension,
        key: SortKey,
        direction: SortDirection,
    ) -> ApiResult<Vec<AssignmentGroup>> {
        let records = self.backend.list_assignments().await?;
        let total = records.len();
        let groups = self
            .grouping
            .sort_then_group(records, dimension, key, direction);
        info!(total, groups = groups.len(), ?dimension, "派工记录已分组");
        Ok(groups)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn row(
        &self,
        node: &HierarchyNode,
        snapshot: &HierarchySnapshot,
        selection: &CascadingSelectionModel,
    ) -> Option<TreeNodeView> {
        let kind = node.kind()?;
        Some(TreeNodeView {
            key: node.key.clone(),
            kind,
            name: node.name.clone(),
            code: node.code.clone(),
            is_leaf: node.is_leaf(),
            selection: derive_selection_state(&node.key, snapshot, selection.selection()),
            load_state: self.store.load_state(&node.key),
        })
    }
}
