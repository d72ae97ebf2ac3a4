// ==========================================
// 设备点检管理驾驶舱 - 派工领域模型
// ==========================================
// 包含: 派工模板 / 创建请求 / 派工记录(只读) / 批量派工结果
// ==========================================

use crate::domain::hierarchy::deserialize_id;
use crate::domain::types::{AssignmentStatus, AssignmentType, Priority};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ==========================================
// AssignmentTemplate - 派工模板
// ==========================================
// 提交给 BulkFanoutExecutor 后不再修改（执行器只持有共享引用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTemplate {
    pub assignment_type: AssignmentType, // 派工类型
    pub assigned_engineer_id: String,    // 负责工程师
    pub priority: Priority,              // 优先级
    pub due_date: Option<NaiveDate>,     // 截止日期
    pub description: Option<String>,     // 说明
}

impl AssignmentTemplate {
    pub fn new(assignment_type: AssignmentType, assigned_engineer_id: impl Into<String>) -> Self {
        Self {
            assignment_type,
            assigned_engineer_id: assigned_engineer_id.into(),
            priority: Priority::default(),
            due_date: None,
            description: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ==========================================
// CreateAssignmentRequest - 单设备创建请求
// ==========================================
// 线上格式: {equipment_id, assignment_type, assigned_to, priority, due_date?, description?}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub equipment_id: String,
    pub assignment_type: AssignmentType,
    pub assigned_to: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateAssignmentRequest {
    pub fn from_template(equipment_id: impl Into<String>, template: &AssignmentTemplate) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            assignment_type: template.assignment_type,
            assigned_to: template.assigned_engineer_id.clone(),
            priority: template.priority,
            due_date: template.due_date,
            description: template.description.clone(),
        }
    }
}

/// 创建成功后后端返回的记录ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAssignment {
    #[serde(deserialize_with = "deserialize_id", alias = "assignment_id")]
    pub id: String,
}

// ==========================================
// AssignmentRecord - 派工记录（只读）
// ==========================================
// 祖先名称为后端反规范化字段，可能部分缺失
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub equipment_id: String,
    #[serde(default)]
    pub equipment_name: Option<String>,
    #[serde(default)]
    pub enterprise_name: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub workshop_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_to_name: Option<String>,
    #[serde(default)]
    pub assignment_type: Option<AssignmentType>,
    /// 状态原始取值（未知取值保留原文，分组时各自成组）
    #[serde(default)]
    pub status: Option<String>,
    /// 优先级原始取值
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AssignmentRecord {
    /// 最小记录（测试与占位使用）
    pub fn new(id: impl Into<String>, equipment_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            equipment_id: equipment_id.into(),
            equipment_name: None,
            enterprise_name: None,
            branch_name: None,
            workshop_name: None,
            assigned_to: None,
            assigned_to_name: None,
            assignment_type: None,
            status: None,
            priority: None,
            due_date: None,
            created_at: None,
            description: None,
        }
    }

    pub fn status_code(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    /// 状态枚举（用于流程序号排序）
    pub fn status_kind(&self) -> Option<AssignmentStatus> {
        self.status_code().map(AssignmentStatus::from_code)
    }

    pub fn priority_code(&self) -> Option<&str> {
        non_blank(self.priority.as_deref())
    }

    /// 优先级枚举（用于严重度序号排序）
    pub fn priority_kind(&self) -> Option<Priority> {
        self.priority_code().map(Priority::from_code)
    }

    /// 工程师显示名：优先姓名，其次ID
    pub fn engineer_label(&self) -> Option<&str> {
        non_blank(self.assigned_to_name.as_deref()).or_else(|| non_blank(self.assigned_to.as_deref()))
    }
}

/// 空串与纯空白视为缺失
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ==========================================
// FanoutResult - 批量派工结果
// ==========================================
// 调用时创建，全部请求结束后定稿，返回调用方后即丢弃（不持久化）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutResult {
    pub succeeded_count: usize,      // 2xx 数量
    pub failed_count: usize,         // 其余数量
    pub first_error: Option<String>, // 按请求顺序第一条失败的 detail
    pub succeeded: Vec<String>,      // 成功的设备ID（请求顺序）
    pub failures: Vec<LeafFailure>,  // 每台失败设备的错误详情（请求顺序）
}

/// 单台设备的失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafFailure {
    pub equipment_id: String,
    pub detail: String,
}

impl FanoutResult {
    pub fn total(&self) -> usize {
        self.succeeded_count + self.failed_count
    }

    pub fn is_total_success(&self) -> bool {
        self.failed_count == 0
    }

    /// 全部失败（succeeded_count = 0）
    pub fn is_total_failure(&self) -> bool {
        self.succeeded_count == 0 && self.failed_count > 0
    }

    pub fn failed_ids(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.equipment_id.clone()).collect()
    }

    /// "N / M 已创建" 摘要
    pub fn summary(&self) -> String {
        format!("{} / {} 已创建", self.succeeded_count, self.total())
    }
}

// ==========================================
// 反序列化辅助
// ==========================================

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
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

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    }))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// 解析后端时间戳
///
/// 支持 RFC3339、无时区日期时间（按 UTC）和纯日期；无法解析返回 None，
/// 不让单条脏数据拖垮整个列表
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
