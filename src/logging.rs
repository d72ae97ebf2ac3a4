// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别，RUST_LOG 优先于配置文件
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认日志过滤
pub const DEFAULT_FILTER: &str = "info";

/// 初始化日志系统（默认过滤 info）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=debug 或 RUST_LOG=inspection_dashboard=trace
///
/// # 示例
/// ```no_run
/// use inspection_dashboard::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// 初始化日志系统，RUST_LOG 未设置时使用 `default_filter`
pub fn init_with_filter(default_filter: &str) {
    fmt()
        .with_env_filter(env_filter(default_filter))
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 格式日志（用于日志采集）
pub fn init_json(default_filter: &str) {
    fmt()
        .json()
        .with_env_filter(env_filter(default_filter))
        .with_current_span(true)
        .with_target(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试；可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}
