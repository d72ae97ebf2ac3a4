// ==========================================
// 设备点检管理驾驶舱 - 派工模板校验器
// ==========================================
// 职责: 提交批量派工前校验模板，校验失败时不发起任何请求
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::assignment::AssignmentTemplate;
use crate::domain::types::{AssignmentType, Priority};

/// 说明最大长度（字符数）
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// 校验派工模板
///
/// # 规则
/// - 负责工程师必填
/// - 派工类型/优先级不得为未知值
/// - 说明不超过 500 字
///
/// # 返回
/// - Ok(()): 校验通过
/// - Err(ApiError::InvalidInput): 第一条不满足的规则
pub fn validate_template(template: &AssignmentTemplate) -> ApiResult<()> {
    if template.assigned_engineer_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("负责工程师不能为空".to_string()));
    }

    if template.assignment_type == AssignmentType::Other {
        return Err(ApiError::InvalidInput("派工类型无效".to_string()));
    }

    if template.priority == Priority::Unknown {
        return Err(ApiError::InvalidInput("优先级无效".to_string()));
    }

    if let Some(description) = &template.description {
        let len = description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ApiError::InvalidInput(format!(
                "说明不能超过{}字（当前{}字）",
                MAX_DESCRIPTION_CHARS, len
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> AssignmentTemplate {
        AssignmentTemplate::new(AssignmentType::Inspection, "E-01")
    }

    #[test]
    fn test_valid_template() {
        let t = template()
            .with_priority(Priority::High)
            .with_description("季度点检");
        assert!(validate_template(&t).is_ok());
    }

    #[test]
    fn test_engineer_required() {
        let t = AssignmentTemplate::new(AssignmentType::Repair, "  ");
        match validate_template(&t) {
            Err(ApiError::InvalidInput(msg)) => assert!(msg.contains("工程师")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_description_limit_counts_chars() {
        // 500 个汉字恰好通过
        let ok = template().with_description("检".repeat(MAX_DESCRIPTION_CHARS));
        assert!(validate_template(&ok).is_ok());

        let too_long = template().with_description("检".repeat(MAX_DESCRIPTION_CHARS + 1));
        assert!(matches!(
            validate_template(&too_long),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_enums_rejected() {
        let t = AssignmentTemplate::new(AssignmentType::Other, "E-01");
        assert!(validate_template(&t).is_err());

        let t = template().with_priority(Priority::Unknown);
        assert!(validate_template(&t).is_err());
    }
}
