// ==========================================
// 设备点检管理驾驶舱 - 配置层
// ==========================================
// 职责: 后端地址、超时、并发上限、日志选项
// 存储: JSON 配置文件 + 环境变量（无本地持久化状态）
// ==========================================

pub mod dashboard_config;

// 重导出核心配置
pub use dashboard_config::{config_keys, default_config_path, ConfigError, DashboardConfig};
