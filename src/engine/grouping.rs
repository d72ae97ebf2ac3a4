// ==========================================
// 设备点检管理驾驶舱 - 派工分组/排序引擎
// ==========================================
// 职责: 对已拉取的派工记录按维度分组、按键排序
// 输入: 派工记录全集（只读）
// 输出: 有序分组 / 有序记录
// 红线:
// - 分组不得丢记录：各组记录数之和等于输入数
// - 回退桶（以分公司/车间名代替企业名）必须与同名的直接桶区分
// - 稳定排序：排序键相同的记录保持输入顺序
// ==========================================

use crate::domain::assignment::{non_blank, AssignmentRecord};
use crate::domain::types::NodeKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 分组维度 / 排序键 / 方向
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    Enterprise,
    Branch,
    Workshop,
    Engineer,
    Status,
    Priority,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    DueDate,
    Priority,
    Status,
    EquipmentName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

// ==========================================
// BucketKey - 分组键
// ==========================================

/// 缺失字段时使用的固定桶
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentinel {
    /// 企业/分公司维度回退链走到底
    Ungrouped,
    /// 车间维度缺失
    NoWorkshop,
    /// 工程师/状态/优先级缺失
    Unassigned,
    /// 不分组时的唯一桶
    All,
}

impl Sentinel {
    pub fn label(&self) -> &str {
        match self {
            Sentinel::Ungrouped => "未分组",
            Sentinel::NoWorkshop => "无车间",
            Sentinel::Unassigned => "未分配",
            Sentinel::All => "全部",
        }
    }
}

/// 分组键
///
/// `Fallback` 与 `Named` 是不同的变体，所以企业名为 "North" 的直接桶
/// 与分公司名为 "North" 的回退桶不会合并。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BucketKey {
    /// 维度字段直接命中
    Named { name: String },
    /// 用更细粒度的层级名代替
    Fallback { level: NodeKind, name: String },
    Sentinel { sentinel: Sentinel },
}

impl BucketKey {
    fn named(name: &str) -> Self {
        BucketKey::Named {
            name: name.to_string(),
        }
    }

    fn fallback(level: NodeKind, name: &str) -> Self {
        BucketKey::Fallback {
            level,
            name: name.to_string(),
        }
    }

    fn sentinel(sentinel: Sentinel) -> Self {
        BucketKey::Sentinel { sentinel }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, BucketKey::Fallback { .. })
    }

    /// 显示标签；回退桶带层级前缀，如 "[分公司] North"
    pub fn label(&self) -> String {
        match self {
            BucketKey::Named { name } => name.clone(),
            BucketKey::Fallback { level, name } => format!("[{}] {}", level.label(), name),
            BucketKey::Sentinel { sentinel } => sentinel.label().to_string(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 一个分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    pub key: BucketKey,
    pub label: String,
    pub records: Vec<AssignmentRecord>,
}

// ==========================================
// GroupingSortEngine
// ==========================================
pub struct GroupingSortEngine {
    // 无状态引擎,不需要注入依赖
}

impl GroupingSortEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 分组
    // ==========================================

    /// 按维度分组
    ///
    /// 分组按首次出现顺序排列，组内保持输入顺序；
    /// 先排序再分组即可得到组内有序、组间按首条记录有序的视图。
    pub fn group_by(
        &self,
        records: Vec<AssignmentRecord>,
        dimension: GroupDimension,
    ) -> Vec<AssignmentGroup> {
        let mut groups: Vec<AssignmentGroup> = Vec::new();
        let mut index: HashMap<BucketKey, usize> = HashMap::new();

        for record in records {
            let key = self.bucket_key(&record, dimension);
            match index.get(&key) {
                Some(&pos) => groups[pos].records.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(AssignmentGroup {
                        label: key.label(),
                        key,
                        records: vec![record],
                    });
                }
            }
        }

        groups
    }

    /// 计算单条记录的分组键
    ///
    /// - 企业: 企业名 → [分公司]名 → [车间]名 → 未分组
    /// - 分公司: 分公司名 → [车间]名 → 未分组
    /// - 车间: 车间名 → 无车间
    /// - 工程师/状态/优先级: 直接取值 → 未分配
    pub fn bucket_key(&self, record: &AssignmentRecord, dimension: GroupDimension) -> BucketKey {
        let enterprise = non_blank(record.enterprise_name.as_deref());
        let branch = non_blank(record.branch_name.as_deref());
        let workshop = non_blank(record.workshop_name.as_deref());

        match dimension {
            GroupDimension::Enterprise => {
                if let Some(name) = enterprise {
                    BucketKey::named(name)
                } else if let Some(name) = branch {
                    BucketKey::fallback(NodeKind::Branch, name)
                } else if let Some(name) = workshop {
                    BucketKey::fallback(NodeKind::Workshop, name)
                } else {
                    BucketKey::sentinel(Sentinel::Ungrouped)
                }
            }
            GroupDimension::Branch => {
                if let Some(name) = branch {
                    BucketKey::named(name)
                } else if let Some(name) = workshop {
                    BucketKey::fallback(NodeKind::Workshop, name)
                } else {
                    BucketKey::sentinel(Sentinel::Ungrouped)
                }
            }
            GroupDimension::Workshop => workshop
                .map(BucketKey::named)
                .unwrap_or_else(|| BucketKey::sentinel(Sentinel::NoWorkshop)),
            GroupDimension::Engineer => record
                .engineer_label()
                .map(BucketKey::named)
                .unwrap_or_else(|| BucketKey::sentinel(Sentinel::Unassigned)),
            GroupDimension::Status => record
                .status_code()
                .map(BucketKey::named)
                .unwrap_or_else(|| BucketKey::sentinel(Sentinel::Unassigned)),
            GroupDimension::Priority => record
                .priority_code()
                .map(BucketKey::named)
                .unwrap_or_else(|| BucketKey::sentinel(Sentinel::Unassigned)),
            GroupDimension::None => BucketKey::sentinel(Sentinel::All),
        }
    }

    // ==========================================
    // 排序
    // ==========================================

    /// 按键排序（稳定）
    ///
    /// - 时间键按时间戳比较，缺失的截止日期视为 0 时刻（升序排最前）
    /// - 优先级/状态按领域序号比较，不按字典序
    /// - 设备名按忽略大小写的自然序比较（见 `locale_compare`）
    /// - 降序只翻转比较结果，相等记录保持输入顺序
    pub fn sort_by(
        &self,
        mut records: Vec<AssignmentRecord>,
        key: SortKey,
        direction: SortDirection,
    ) -> Vec<AssignmentRecord> {
        records.sort_by(|a, b| {
            let ord = self.compare(a, b, key);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        records
    }

    /// 先排序再分组
    pub fn sort_then_group(
        &self,
        records: Vec<AssignmentRecord>,
        dimension: GroupDimension,
        key: SortKey,
        direction: SortDirection,
    ) -> Vec<AssignmentGroup> {
        let sorted = self.sort_by(records, key, direction);
        self.group_by(sorted, dimension)
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 按单个键比较两条记录（升序语义）
    pub fn compare(&self, a: &AssignmentRecord, b: &AssignmentRecord, key: SortKey) -> Ordering {
        match key {
            SortKey::CreatedAt => timestamp_millis(a.created_at).cmp(&timestamp_millis(b.created_at)),
            SortKey::DueDate => timestamp_millis(a.due_date).cmp(&timestamp_millis(b.due_date)),
            SortKey::Priority => {
                let pa = a.priority_kind().map(|p| p.ordinal()).unwrap_or(0);
                let pb = b.priority_kind().map(|p| p.ordinal()).unwrap_or(0);
                pa.cmp(&pb)
            }
            SortKey::Status => {
                let sa = a.status_kind().map(|s| s.ordinal()).unwrap_or(0);
                let sb = b.status_kind().map(|s| s.ordinal()).unwrap_or(0);
                sa.cmp(&sb)
            }
            SortKey::EquipmentName => locale_compare(
                a.equipment_name.as_deref().unwrap_or(""),
                b.equipment_name.as_deref().unwrap_or(""),
            ),
        }
    }
}

impl Default for GroupingSortEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 缺失时间戳按 0 时刻处理
fn timestamp_millis(value: Option<DateTime<Utc>>) -> i64 {
    value.map(|dt| dt.timestamp_millis()).unwrap_or(0)
}

/// 名称比较（忽略大小写的自然序）
///
/// 先忽略大小写逐字符比较，数字串按数值比较（"2#泵" 排在 "10#泵" 前），
/// 仍相等时再按原文比较，保证全序。
/// 非数字字符按 Unicode 码位比较，不做区域排序规则：汉字不按拼音排序。
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    natural_cmp(&a.to_lowercase(), &b.to_lowercase()).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let na = take_digits(&mut ai);
                let nb = take_digits(&mut bi);
                let ord = na
                    .trim_start_matches('0')
                    .len()
                    .cmp(&nb.trim_start_matches('0').len())
                    .then_with(|| na.trim_start_matches('0').cmp(nb.trim_start_matches('0')));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        it.next();
    }
    digits
}
