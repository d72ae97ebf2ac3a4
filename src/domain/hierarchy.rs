// ==========================================
// 设备点检管理驾驶舱 - 组织层级实体
// ==========================================
// 层级: 企业 → 分公司 → 车间 → 设备
// 子节点列表由 HierarchyStore 持有，节点本身不可变
// ==========================================

use crate::domain::types::NodeKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ==========================================
// NodeKey - 节点键
// ==========================================

/// 节点键（种类 + ID）
///
/// 后端各层级的 ID 相互独立（企业 1 与分公司 1 可以同时存在），
/// 所以缓存必须以 (种类, ID) 为键。`Root` 是企业列表的虚拟父节点。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKey {
    Root,
    Node { kind: NodeKind, id: String },
}

impl NodeKey {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        NodeKey::Node {
            kind,
            id: id.into(),
        }
    }

    pub fn enterprise(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Enterprise, id)
    }

    pub fn branch(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Branch, id)
    }

    pub fn workshop(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Workshop, id)
    }

    pub fn equipment(id: impl Into<String>) -> Self {
        Self::new(NodeKind::Equipment, id)
    }

    /// 节点种类；Root 没有种类
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            NodeKey::Root => None,
            NodeKey::Node { kind, .. } => Some(*kind),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            NodeKey::Root => None,
            NodeKey::Node { id, .. } => Some(id.as_str()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind().map(|k| k.is_leaf()).unwrap_or(false)
    }

    /// 子节点种类；叶子返回 None
    pub fn child_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKey::Root => Some(NodeKind::Enterprise),
            NodeKey::Node { kind, .. } => kind.child_kind(),
        }
    }

    /// 若为设备节点，返回设备ID
    pub fn equipment_id(&self) -> Option<&str> {
        match self {
            NodeKey::Node {
                kind: NodeKind::Equipment,
                id,
            } => Some(id.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Root => write!(f, "ROOT"),
            NodeKey::Node { kind, id } => write!(f, "{}:{}", kind, id),
        }
    }
}

// ==========================================
// HierarchyEntry - 后端层级列表条目
// ==========================================

/// 层级读接口返回的条目 `{id, name, code?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl HierarchyEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: None,
        }
    }
}

// ==========================================
// HierarchyNode - 已加载的层级节点
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub key: NodeKey,
    pub name: String,
    pub code: Option<String>,
    pub parent: NodeKey,
}

impl HierarchyNode {
    /// 由父节点键和后端条目构造子节点
    ///
    /// 父节点为叶子时返回 None
    pub fn from_entry(parent: &NodeKey, entry: HierarchyEntry) -> Option<Self> {
        let kind = parent.child_kind()?;
        Some(Self {
            key: NodeKey::new(kind, entry.id),
            name: entry.name,
            code: entry.code,
            parent: parent.clone(),
        })
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.key.kind()
    }

    pub fn is_leaf(&self) -> bool {
        self.key.is_leaf()
    }
}

// ==========================================
// ID 反序列化
// ==========================================

/// 后端 ID 可能是 JSON 数字也可能是字符串，统一为字符串
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}
