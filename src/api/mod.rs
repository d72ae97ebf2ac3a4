// ==========================================
// 设备点检管理驾驶舱 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供界面命令层调用
// ==========================================

pub mod assignment_api;
pub mod error;
pub mod validator;

// 重导出核心类型
pub use assignment_api::{AssignmentApi, TreeNodeView};
pub use error::{ApiError, ApiResult};
pub use validator::{validate_template, MAX_DESCRIPTION_CHARS};
