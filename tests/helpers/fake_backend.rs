// ==========================================
// 内存后端替身 - 用于集成测试
// ==========================================
// 能力:
// - 按调用顺序记录每一次请求
// - 指定节点/设备返回失败
// - 层级拉取/派工创建可加延时（观察在途去重与并发上限）
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use inspection_dashboard::domain::{
    AssignmentRecord, CreateAssignmentRequest, CreatedAssignment, HierarchyEntry, NodeKey,
};
use inspection_dashboard::transport::{
    AssignmentBackend, HierarchySource, TransportError, TransportResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 一次后端调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Children(NodeKey),
    Create(String),
    ListAssignments,
}

#[derive(Default)]
pub struct FakeBackend {
    tree: Mutex<HashMap<NodeKey, Vec<HierarchyEntry>>>,
    calls: Mutex<Vec<Call>>,
    failing_nodes: Mutex<HashMap<NodeKey, TransportError>>,
    failing_equipment: Mutex<HashMap<String, TransportError>>,
    records: Mutex<Vec<AssignmentRecord>>,
    created: Mutex<Vec<CreateAssignmentRequest>>,
    fetch_delay: Mutex<Option<Duration>>,
    create_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标准测试树
    ///
    /// ```text
    /// E1 华东能源
    ///   B1 苏州分公司
    ///     W1 一车间: EQ1 1#泵, EQ2 2#泵
    ///     W2 二车间: EQ3 3#风机
    ///   B2 无锡分公司（没有车间）
    /// E2 华北能源
    ///   B3 天津分公司
    ///     W3 三车间: EQ4 4#压缩机
    /// ```
    pub fn sample() -> Self {
        let backend = Self::new();
        backend.set_children(NodeKey::Root, &[("E1", "华东能源"), ("E2", "华北能源")]);
        backend.set_children(
            NodeKey::enterprise("E1"),
            &[("B1", "苏州分公司"), ("B2", "无锡分公司")],
        );
        backend.set_children(NodeKey::branch("B1"), &[("W1", "一车间"), ("W2", "二车间")]);
        backend.set_children(NodeKey::branch("B2"), &[]);
        backend.set_children(NodeKey::workshop("W1"), &[("EQ1", "1#泵"), ("EQ2", "2#泵")]);
        backend.set_children(NodeKey::workshop("W2"), &[("EQ3", "3#风机")]);
        backend.set_children(NodeKey::enterprise("E2"), &[("B3", "天津分公司")]);
        backend.set_children(NodeKey::branch("B3"), &[("W3", "三车间")]);
        backend.set_children(NodeKey::workshop("W3"), &[("EQ4", "4#压缩机")]);
        backend
    }

    // ==========================================
    // 场景设置
    // ==========================================

    pub fn set_children(&self, parent: NodeKey, entries: &[(&str, &str)]) {
        let entries = entries
            .iter()
            .map(|(id, name)| HierarchyEntry::new(*id, *name))
            .collect();
        self.tree.lock().unwrap().insert(parent, entries);
    }

    pub fn fail_node(&self, key: NodeKey, status: u16, detail: &str) {
        self.failing_nodes.lock().unwrap().insert(
            key,
            TransportError::Status {
                status,
                detail: detail.to_string(),
            },
        );
    }

    pub fn heal_node(&self, key: &NodeKey) {
        self.failing_nodes.lock().unwrap().remove(key);
    }

    pub fn fail_equipment(&self, equipment_id: &str, status: u16, detail: &str) {
        self.failing_equipment.lock().unwrap().insert(
            equipment_id.to_string(),
            TransportError::Status {
                status,
                detail: detail.to_string(),
            },
        );
    }

    pub fn heal_equipment(&self, equipment_id: &str) {
        self.failing_equipment.lock().unwrap().remove(equipment_id);
    }

    pub fn set_records(&self, records: Vec<AssignmentRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    // ==========================================
    // 断言辅助
    // ==========================================

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// 某节点被拉取的次数
    pub fn fetch_count(&self, key: &NodeKey) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::Children(k) if k == key))
            .count()
    }

    pub fn create_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Create(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<CreateAssignmentRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    async fn children_of(&self, key: NodeKey) -> TransportResult<Vec<HierarchyEntry>> {
        self.calls.lock().unwrap().push(Call::Children(key.clone()));

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failing_nodes.lock().unwrap().get(&key) {
            return Err(err.clone());
        }
        Ok(self.tree.lock().unwrap().get(&key).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl HierarchySource for FakeBackend {
    async fn list_enterprises(&self) -> TransportResult<Vec<HierarchyEntry>> {
        self.children_of(NodeKey::Root).await
    }

    async fn list_branches(&self, enterprise_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.children_of(NodeKey::enterprise(enterprise_id)).await
    }

    async fn list_workshops(&self, branch_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.children_of(NodeKey::branch(branch_id)).await
    }

    async fn list_equipment(&self, workshop_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.children_of(NodeKey::workshop(workshop_id)).await
    }
}

#[async_trait]
impl AssignmentBackend for FakeBackend {
    async fn create_assignment(
        &self,
        request: &CreateAssignmentRequest,
    ) -> TransportResult<Option<CreatedAssignment>> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(request.equipment_id.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self
            .failing_equipment
            .lock()
            .unwrap()
            .get(&request.equipment_id)
        {
            return Err(err.clone());
        }

        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(Some(CreatedAssignment {
            id: format!("A{}", created.len()),
        }))
    }

    async fn list_assignments(&self) -> TransportResult<Vec<AssignmentRecord>> {
        self.calls.lock().unwrap().push(Call::ListAssignments);
        Ok(self.records.lock().unwrap().clone())
    }
}
