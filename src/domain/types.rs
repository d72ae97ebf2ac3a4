// ==========================================
// 设备点检管理驾驶舱 - 领域类型定义
// ==========================================
// 职责: 层级节点种类、三态勾选、派工优先级/状态/类型
// 序列化格式: SCREAMING_SNAKE_CASE (与后端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 层级节点种类 (Node Kind)
// ==========================================
// 顺序: Enterprise > Branch > Workshop > Equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Enterprise, // 企业
    Branch,     // 分公司
    Workshop,   // 车间
    Equipment,  // 设备（叶子）
}

impl NodeKind {
    /// 下一层级的种类；设备为叶子，没有下一层
    pub fn child_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKind::Enterprise => Some(NodeKind::Branch),
            NodeKind::Branch => Some(NodeKind::Workshop),
            NodeKind::Workshop => Some(NodeKind::Equipment),
            NodeKind::Equipment => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Equipment)
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Enterprise => "ENTERPRISE",
            NodeKind::Branch => "BRANCH",
            NodeKind::Workshop => "WORKSHOP",
            NodeKind::Equipment => "EQUIPMENT",
        }
    }

    /// 中文显示名（分组回退桶前缀使用）
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Enterprise => "企业",
            NodeKind::Branch => "分公司",
            NodeKind::Workshop => "车间",
            NodeKind::Equipment => "设备",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 三态勾选状态 (Selection State)
// ==========================================
// 派生值，不存储；ALL 必须有完整加载的证据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionState {
    None,    // 未选
    Partial, // 部分选中
    All,     // 全选
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionState::None => write!(f, "NONE"),
            SelectionState::Partial => write!(f, "PARTIAL"),
            SelectionState::All => write!(f, "ALL"),
        }
    }
}

// ==========================================
// 派工优先级 (Priority)
// ==========================================
// 排序按领域严重度序号，不按字典序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
    /// 后端返回了未知取值
    #[serde(other)]
    Unknown,
}

impl Priority {
    /// 严重度序号: LOW=1, NORMAL=2, HIGH=3, URGENT=4, 未知=0
    pub fn ordinal(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
            Priority::Unknown => 0,
        }
    }

    /// 按后端取值解析，无法识别的取值为 Unknown
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "LOW" => Priority::Low,
            "NORMAL" => Priority::Normal,
            "HIGH" => Priority::High,
            "URGENT" => Priority::Urgent,
            _ => Priority::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
            Priority::Unknown => "UNKNOWN",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 派工状态 (Assignment Status)
// ==========================================
// 排序按流程序号: PENDING=1 → IN_PROGRESS=2 → COMPLETED=3 → CANCELLED=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl AssignmentStatus {
    pub fn ordinal(&self) -> u8 {
        match self {
            AssignmentStatus::Pending => 1,
            AssignmentStatus::InProgress => 2,
            AssignmentStatus::Completed => 3,
            AssignmentStatus::Cancelled => 4,
            AssignmentStatus::Unknown => 0,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "PENDING" => AssignmentStatus::Pending,
            "IN_PROGRESS" => AssignmentStatus::InProgress,
            "COMPLETED" => AssignmentStatus::Completed,
            "CANCELLED" => AssignmentStatus::Cancelled,
            _ => AssignmentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::InProgress => "IN_PROGRESS",
            AssignmentStatus::Completed => "COMPLETED",
            AssignmentStatus::Cancelled => "CANCELLED",
            AssignmentStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 派工类型 (Assignment Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentType {
    Diagnostic,  // 诊断
    Inspection,  // 点检
    Maintenance, // 保养
    Repair,      // 维修
    #[serde(other)]
    Other,
}

impl AssignmentType {
    pub fn as_str(&self) -> &str {
        match self {
            AssignmentType::Diagnostic => "DIAGNOSTIC",
            AssignmentType::Inspection => "INSPECTION",
            AssignmentType::Maintenance => "MAINTENANCE",
            AssignmentType::Repair => "REPAIR",
            AssignmentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
