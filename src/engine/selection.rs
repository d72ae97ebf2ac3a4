// ==========================================
// 设备点检管理驾驶舱 - 级联勾选模型
// ==========================================
// 职责: 维护设备叶子的选中集合，推导祖先节点三态
// 红线:
// - 子树未完整加载时，节点最多报告 PARTIAL，不得报告 ALL
// - set_subtree 先加载完所有层级，再一次性修改选中集合；
//   任一层加载失败则整体放弃，选中集合不变
// ==========================================

use crate::domain::hierarchy::NodeKey;
use crate::domain::types::SelectionState;
use crate::engine::error::EngineResult;
use crate::engine::hierarchy_store::{HierarchySnapshot, HierarchyStore};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// CascadingSelectionModel
// ==========================================
pub struct CascadingSelectionModel {
    store: Arc<HierarchyStore>,
    /// 选中的设备ID；只由本模型修改
    selected: HashSet<String>,
}

impl CascadingSelectionModel {
    pub fn new(store: Arc<HierarchyStore>) -> Self {
        Self {
            store,
            selected: HashSet::new(),
        }
    }

    pub fn store(&self) -> &Arc<HierarchyStore> {
        &self.store
    }

    // ==========================================
    // 修改
    // ==========================================

    /// 切换单台设备的选中状态
    ///
    /// # 返回
    /// 切换后是否选中
    pub fn toggle_leaf(&mut self, equipment_id: &str) -> bool {
        if self.selected.remove(equipment_id) {
            false
        } else {
            self.selected.insert(equipment_id.to_string());
            true
        }
    }

    /// 勾选/取消整棵子树
    ///
    /// 逐层向下加载（同层兄弟节点并发加载），收集全部设备ID后一次性写入。
    /// 重复调用结果相同；空分支为空操作。
    ///
    /// # 参数
    /// - key: 子树根节点（设备节点等同于直接增删）
    /// - checked: true 加入，false 移除
    ///
    /// # 返回
    /// - Ok(usize): 子树中发现的设备数
    /// - Err(EngineError::LoadFailure): 任一层加载失败，选中集合未修改
    pub async fn set_subtree(&mut self, key: &NodeKey, checked: bool) -> EngineResult<usize> {
        let leaves = self.collect_leaves(key).await?;

        if checked {
            self.selected.extend(leaves.iter().cloned());
        } else {
            for id in &leaves {
                self.selected.remove(id);
            }
        }

        info!(
            node = %key,
            checked,
            leaves = leaves.len(),
            selected_total = self.selected.len(),
            "子树勾选已应用"
        );
        Ok(leaves.len())
    }

    /// 清空选中集合
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// 按设备ID批量移除（派工成功后清理已提交部分使用）
    pub fn remove_all<'a>(&mut self, equipment_ids: impl IntoIterator<Item = &'a String>) {
        for id in equipment_ids {
            self.selected.remove(id);
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 节点三态（基于当前已加载部分，不触发加载）
    pub fn state_of(&self, key: &NodeKey) -> SelectionState {
        derive_selection_state(key, &self.store.snapshot(), &self.selected)
    }

    /// 批量查询三态，整批共用一个快照
    pub fn states_of(&self, keys: &[NodeKey]) -> Vec<SelectionState> {
        let snapshot = self.store.snapshot();
        keys.iter()
            .map(|key| derive_selection_state(key, &snapshot, &self.selected))
            .collect()
    }

    pub fn is_selected(&self, equipment_id: &str) -> bool {
        self.selected.contains(equipment_id)
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selected
    }

    /// 选中的设备ID（排序后，保证派工请求顺序确定）
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 逐层加载并收集子树全部设备ID
    ///
    /// 第 N 层全部加载完成后才进入第 N+1 层：下一层节点在父列表返回前无从得知。
    async fn collect_leaves(&self, key: &NodeKey) -> EngineResult<Vec<String>> {
        if let Some(id) = key.equipment_id() {
            return Ok(vec![id.to_string()]);
        }

        let mut leaves = Vec::new();
        let mut frontier = vec![key.clone()];
        let mut depth = 0;

        while !frontier.is_empty() {
            debug!(node = %key, depth, width = frontier.len(), "加载子树层级");
            let levels = try_join_all(frontier.iter().map(|k| self.store.get_children(k))).await?;

            let mut next = Vec::new();
            for children in levels {
                for child in children.iter() {
                    match child.key.equipment_id() {
                        Some(id) => leaves.push(id.to_string()),
                        None => next.push(child.key.clone()),
                    }
                }
            }

            frontier = next;
            depth += 1;
        }

        Ok(leaves)
    }
}

// ==========================================
// 三态推导（纯函数）
// ==========================================

/// 子树统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LeafTally {
    selected: usize, // 已加载且选中的设备数
    known: usize,    // 已加载的设备数
    complete: bool,  // 子树是否全部加载
}

fn tally(key: &NodeKey, snapshot: &HierarchySnapshot, selected: &HashSet<String>) -> LeafTally {
    if let Some(id) = key.equipment_id() {
        return LeafTally {
            selected: usize::from(selected.contains(id)),
            known: 1,
            complete: true,
        };
    }

    match snapshot.children(key) {
        None => LeafTally::default(),
        Some(children) => children.iter().fold(
            LeafTally {
                complete: true,
                ..LeafTally::default()
            },
            |acc, child| {
                let sub = tally(&child.key, snapshot, selected);
                LeafTally {
                    selected: acc.selected + sub.selected,
                    known: acc.known + sub.known,
                    complete: acc.complete && sub.complete,
                }
            },
        ),
    }
}

/// 推导节点三态
///
/// - 设备: 选中为 ALL，否则 NONE
/// - 内部节点，子树未完整加载: 无已加载设备被选中为 NONE，否则 PARTIAL
/// - 内部节点，子树完整加载: 全选 ALL，全未选 NONE，其余 PARTIAL；
///   没有任何设备的空分支为 NONE
pub fn derive_selection_state(
    key: &NodeKey,
    snapshot: &HierarchySnapshot,
    selected: &HashSet<String>,
) -> SelectionState {
    let t = tally(key, snapshot, selected);

    if t.selected == 0 {
        SelectionState::None
    } else if t.complete && t.selected == t.known {
        SelectionState::All
    } else {
        SelectionState::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hierarchy::HierarchyNode;

    fn node(key: NodeKey, parent: &NodeKey) -> HierarchyNode {
        HierarchyNode {
            name: key.to_string(),
            key,
            code: None,
            parent: parent.clone(),
        }
    }

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// 企业 E → 分公司 B → 车间 W1(设备 a,b) / W2(未加载)
    fn partial_tree() -> HierarchySnapshot {
        let e = NodeKey::enterprise("E");
        let b = NodeKey::branch("B");
        let w1 = NodeKey::workshop("W1");
        let w2 = NodeKey::workshop("W2");

        let mut snap = HierarchySnapshot::new();
        snap.insert(e.clone(), vec![node(b.clone(), &e)]);
        snap.insert(b.clone(), vec![node(w1.clone(), &b), node(w2, &b)]);
        snap.insert(
            w1.clone(),
            vec![
                node(NodeKey::equipment("a"), &w1),
                node(NodeKey::equipment("b"), &w1),
            ],
        );
        snap
    }

    #[test]
    fn test_leaf_state() {
        let snap = HierarchySnapshot::new();
        let selected = set(&["a"]);
        assert_eq!(
            derive_selection_state(&NodeKey::equipment("a"), &snap, &selected),
            SelectionState::All
        );
        assert_eq!(
            derive_selection_state(&NodeKey::equipment("z"), &snap, &selected),
            SelectionState::None
        );
    }

    #[test]
    fn test_incomplete_subtree_never_reports_all() {
        let snap = partial_tree();
        let selected = set(&["a", "b"]);

        // W1 完整加载且全选
        assert_eq!(
            derive_selection_state(&NodeKey::workshop("W1"), &snap, &selected),
            SelectionState::All
        );
        // B 下 W2 未加载：已加载设备全选也只能是 PARTIAL
        assert_eq!(
            derive_selection_state(&NodeKey::branch("B"), &snap, &selected),
            SelectionState::Partial
        );
        assert_eq!(
            derive_selection_state(&NodeKey::enterprise("E"), &snap, &selected),
            SelectionState::Partial
        );
    }

    #[test]
    fn test_unloaded_node_without_selection_is_none() {
        let snap = partial_tree();
        let selected = set(&["zzz"]);
        assert_eq!(
            derive_selection_state(&NodeKey::workshop("W2"), &snap, &selected),
            SelectionState::None
        );
        assert_eq!(
            derive_selection_state(&NodeKey::branch("B"), &snap, &selected),
            SelectionState::None
        );
    }

    #[test]
    fn test_empty_loaded_branch_is_none() {
        let w = NodeKey::workshop("EMPTY");
        let mut snap = HierarchySnapshot::new();
        snap.insert(w.clone(), vec![]);
        assert_eq!(
            derive_selection_state(&w, &snap, &set(&["a"])),
            SelectionState::None
        );
    }
}
