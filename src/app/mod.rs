// ==========================================
// 设备点检管理驾驶舱 - 应用层
// ==========================================
// 职责: 组装 配置 → 传输 → 引擎 → API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
