// ==========================================
// 设备点检管理驾驶舱 - 层级缓存
// ==========================================
// 职责: 持有 企业→分公司→车间→设备 四级树，按需懒加载子节点
// 红线:
// - 子节点列表要么未加载，要么是完整列表，不允许部分/过期列表
// - 同一节点并发加载只发一次请求，后来者等待在途请求
// - 加载失败不缓存为空列表，节点保持未加载（可重试）
// ==========================================

use crate::domain::hierarchy::{HierarchyEntry, HierarchyNode, NodeKey};
use crate::domain::types::NodeKind;
use crate::engine::error::LoadError;
use crate::transport::backend_trait::HierarchySource;
use crate::transport::error::TransportResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

/// 已加载的子节点列表（整体替换，不做局部修改）
pub type ChildList = Arc<[HierarchyNode]>;

type LoadFuture = Shared<BoxFuture<'static, Result<ChildList, LoadError>>>;

// ==========================================
// LoadState - 子节点加载状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

enum ChildSlot {
    /// 在途请求；generation 用于识别被 invalidate 作废的请求
    Loading {
        generation: u64,
        future: LoadFuture,
    },
    Loaded(ChildList),
}

#[derive(Default)]
struct StoreInner {
    slots: HashMap<NodeKey, ChildSlot>,
    nodes: HashMap<NodeKey, HierarchyNode>,
    next_generation: u64,
}

fn lock(inner: &Mutex<StoreInner>) -> MutexGuard<'_, StoreInner> {
    // 每次写入都是单条 insert/remove，锁中毒时状态仍一致
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// ==========================================
// HierarchyStore
// ==========================================
pub struct HierarchyStore {
    source: Arc<dyn HierarchySource>,
    inner: Arc<Mutex<StoreInner>>,
}

impl HierarchyStore {
    /// 创建层级缓存
    ///
    /// # 参数
    /// - source: 层级读接口（唯一与之交互的组件）
    pub fn new(source: Arc<dyn HierarchySource>) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(StoreInner::default())),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 获取子节点列表
    ///
    /// - 已加载: 直接返回缓存
    /// - 加载中: 等待在途请求，不重复发请求
    /// - 未加载: 发起一次请求，写入缓存后返回
    ///
    /// 在途标记在第一次 await 之前写入，缓存写入发生在共享 future 内部，
    /// 所以任何等待者拿到结果时缓存已经就绪。
    ///
    /// # 返回
    /// - Ok(ChildList): 有序子节点列表（设备节点恒为空）
    /// - Err(LoadError): 加载失败，节点回到未加载
    pub async fn get_children(&self, key: &NodeKey) -> Result<ChildList, LoadError> {
        if key.is_leaf() {
            return Ok(Arc::from(Vec::new()));
        }

        let future = {
            let mut inner = lock(&self.inner);
            match inner.slots.get(key) {
                Some(ChildSlot::Loaded(children)) => {
                    debug!(node = %key, count = children.len(), "子节点命中缓存");
                    return Ok(children.clone());
                }
                Some(ChildSlot::Loading { future, .. }) => {
                    debug!(node = %key, "子节点加载中，等待在途请求");
                    future.clone()
                }
                None => {
                    let generation = inner.next_generation;
                    inner.next_generation += 1;
                    let future = self.start_fetch(key.clone(), generation);
                    inner.slots.insert(
                        key.clone(),
                        ChildSlot::Loading {
                            generation,
                            future: future.clone(),
                        },
                    );
                    future
                }
            }
        };

        future.await
    }

    /// 企业列表（Root 的子节点）
    pub async fn load_roots(&self) -> Result<ChildList, LoadError> {
        self.get_children(&NodeKey::Root).await
    }

    /// 子节点是否已加载（设备节点恒为 true）
    pub fn is_loaded(&self, key: &NodeKey) -> bool {
        self.load_state(key) == LoadState::Loaded
    }

    pub fn load_state(&self, key: &NodeKey) -> LoadState {
        if key.is_leaf() {
            return LoadState::Loaded;
        }
        match lock(&self.inner).slots.get(key) {
            Some(ChildSlot::Loaded(_)) => LoadState::Loaded,
            Some(ChildSlot::Loading { .. }) => LoadState::Loading,
            None => LoadState::Unloaded,
        }
    }

    /// 已缓存的子节点（不触发加载）
    pub fn cached_children(&self, key: &NodeKey) -> Option<ChildList> {
        if key.is_leaf() {
            return Some(Arc::from(Vec::new()));
        }
        match lock(&self.inner).slots.get(key) {
            Some(ChildSlot::Loaded(children)) => Some(children.clone()),
            _ => None,
        }
    }

    /// 已加载过的节点
    pub fn node(&self, key: &NodeKey) -> Option<HierarchyNode> {
        lock(&self.inner).nodes.get(key).cloned()
    }

    /// 已加载部分的快照（供纯函数推导三态）
    pub fn snapshot(&self) -> HierarchySnapshot {
        let inner = lock(&self.inner);
        let children = inner
            .slots
            .iter()
            .filter_map(|(key, slot)| match slot {
                ChildSlot::Loaded(list) => Some((key.clone(), list.clone())),
                ChildSlot::Loading { .. } => None,
            })
            .collect();
        HierarchySnapshot { children }
    }

    /// 作废节点及其全部后代的子节点缓存
    ///
    /// 下次 get_children 会重新拉取并整体替换；
    /// 作废时仍在途的请求完成后不再写入缓存。
    ///
    /// # 返回
    /// 被清除的缓存条目数
    pub fn invalidate(&self, key: &NodeKey) -> usize {
        let mut inner = lock(&self.inner);
        let mut pending = vec![key.clone()];
        let mut removed = 0;

        while let Some(current) = pending.pop() {
            if let Some(slot) = inner.slots.remove(&current) {
                removed += 1;
                if let ChildSlot::Loaded(children) = slot {
                    for child in children.iter() {
                        inner.nodes.remove(&child.key);
                        pending.push(child.key.clone());
                    }
                }
            }
        }

        debug!(node = %key, removed, "层级缓存已作废");
        removed
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 构造共享的加载 future（惰性，首个等待者驱动）
    fn start_fetch(&self, key: NodeKey, generation: u64) -> LoadFuture {
        let source = Arc::clone(&self.source);
        let inner: Weak<Mutex<StoreInner>> = Arc::downgrade(&self.inner);

        async move {
            debug!(node = %key, "开始加载子节点");
            let fetched = fetch_level(source.as_ref(), &key).await;

            let result = match fetched {
                Ok(entries) => {
                    let children: ChildList = entries
                        .into_iter()
                        .filter_map(|entry| HierarchyNode::from_entry(&key, entry))
                        .collect::<Vec<_>>()
                        .into();
                    debug!(node = %key, count = children.len(), "子节点加载完成");
                    Ok(children)
                }
                Err(source_err) => {
                    warn!(node = %key, error = %source_err, "子节点加载失败");
                    Err(LoadError::new(key.clone(), source_err))
                }
            };

            if let Some(inner) = inner.upgrade() {
                let mut guard = lock(&inner);
                let still_current = matches!(
                    guard.slots.get(&key),
                    Some(ChildSlot::Loading { generation: g, .. }) if *g == generation
                );
                if still_current {
                    match &result {
                        Ok(children) => {
                            for child in children.iter() {
                                guard.nodes.insert(child.key.clone(), child.clone());
                            }
                            guard
                                .slots
                                .insert(key.clone(), ChildSlot::Loaded(children.clone()));
                        }
                        Err(_) => {
                            guard.slots.remove(&key);
                        }
                    }
                }
            }

            result
        }
        .boxed()
        .shared()
    }
}

/// 按父节点种类分派到对应层级接口
async fn fetch_level(
    source: &dyn HierarchySource,
    parent: &NodeKey,
) -> TransportResult<Vec<HierarchyEntry>> {
    match parent {
        NodeKey::Root => source.list_enterprises().await,
        NodeKey::Node { kind, id } => match kind {
            NodeKind::Enterprise => source.list_branches(id).await,
            NodeKind::Branch => source.list_workshops(id).await,
            NodeKind::Workshop => source.list_equipment(id).await,
            NodeKind::Equipment => Ok(Vec::new()),
        },
    }
}

// ==========================================
// HierarchySnapshot - 已加载部分的只读快照
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct HierarchySnapshot {
    children: HashMap<NodeKey, ChildList>,
}

impl HierarchySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个父节点的完整子节点列表
    pub fn insert(&mut self, parent: NodeKey, children: Vec<HierarchyNode>) {
        self.children.insert(parent, children.into());
    }

    /// 子节点列表；未加载返回 None，设备节点返回空
    pub fn children(&self, key: &NodeKey) -> Option<&[HierarchyNode]> {
        if key.is_leaf() {
            return Some(&[]);
        }
        self.children.get(key).map(|list| list.as_ref())
    }

    pub fn is_loaded(&self, key: &NodeKey) -> bool {
        self.children(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::error::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 单企业单分公司；分公司加载可配置失败
    struct TinySource {
        calls: AtomicUsize,
        fail_branch_list: bool,
    }

    impl TinySource {
        fn new(fail_branch_list: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_branch_list,
            }
        }
    }

    #[async_trait]
    impl HierarchySource for TinySource {
        async fn list_enterprises(&self) -> TransportResult<Vec<HierarchyEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![HierarchyEntry::new("1", "集团")])
        }

        async fn list_branches(&self, _enterprise_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_branch_list {
                return Err(TransportError::Status {
                    status: 500,
                    detail: "db down".to_string(),
                });
            }
            Ok(vec![HierarchyEntry::new("10", "北区")])
        }

        async fn list_workshops(&self, _branch_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn list_equipment(&self, _workshop_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_cached_after_first_load() {
        let source = Arc::new(TinySource::new(false));
        let store = HierarchyStore::new(source.clone());

        assert_eq!(store.load_state(&NodeKey::Root), LoadState::Unloaded);
        let first = store.load_roots().await.unwrap();
        let second = store.load_roots().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].key, NodeKey::enterprise("1"));
        assert_eq!(first[0].parent, NodeKey::Root);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(store.is_loaded(&NodeKey::Root));
        assert_eq!(store.node(&NodeKey::enterprise("1")).unwrap().name, "集团");
    }

    #[tokio::test]
    async fn test_failed_load_stays_unloaded_and_is_retryable() {
        let source = Arc::new(TinySource::new(true));
        let store = HierarchyStore::new(source.clone());
        let enterprise = NodeKey::enterprise("1");

        let err = store.get_children(&enterprise).await.unwrap_err();
        assert_eq!(err.node, enterprise);
        assert_eq!(err.status(), Some(500));
        assert_eq!(store.load_state(&enterprise), LoadState::Unloaded);
        assert!(store.cached_children(&enterprise).is_none());
        assert!(!store.snapshot().is_loaded(&enterprise));

        // 重试会重新发请求
        let _ = store.get_children(&enterprise).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_leaf_has_no_children_and_no_fetch() {
        let source = Arc::new(TinySource::new(false));
        let store = HierarchyStore::new(source.clone());
        let leaf = NodeKey::equipment("E1");

        assert!(store.get_children(&leaf).await.unwrap().is_empty());
        assert!(store.is_loaded(&leaf));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalidate_drops_descendants() {
        let source = Arc::new(TinySource::new(false));
        let store = HierarchyStore::new(source.clone());

        store.load_roots().await.unwrap();
        store.get_children(&NodeKey::enterprise("1")).await.unwrap();
        assert!(store.is_loaded(&NodeKey::enterprise("1")));

        let removed = store.invalidate(&NodeKey::Root);
        assert_eq!(removed, 2);
        assert!(!store.is_loaded(&NodeKey::Root));
        assert!(!store.is_loaded(&NodeKey::enterprise("1")));
        assert!(store.node(&NodeKey::enterprise("1")).is_none());

        store.load_roots().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }
}
