// ==========================================
// 设备点检管理驾驶舱 - 命令行入口
// ==========================================
// 用途: 连通性自检
// 1. 加载配置并初始化日志
// 2. 拉取企业列表
// 3. 拉取派工记录并按企业分组
// 会话令牌: 由认证协作方写入 INSPECTION_API_TOKEN
// ==========================================

use anyhow::Context;
use inspection_dashboard::app::AppState;
use inspection_dashboard::config::DashboardConfig;
use inspection_dashboard::{logging, GroupDimension, NodeKey, SortDirection, SortKey};

const TOKEN_ENV: &str = "INSPECTION_API_TOKEN";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("无法加载配置")?;

    if config.json_logs {
        logging::init_json(&config.log_filter);
    } else {
        logging::init_with_filter(&config.log_filter);
    }

    tracing::info!("==================================================");
    tracing::info!("{}", inspection_dashboard::APP_NAME);
    tracing::info!("系统版本: {}", inspection_dashboard::VERSION);
    tracing::info!("==================================================");

    let token = std::env::var(TOKEN_ENV).ok();
    if token.is_none() {
        tracing::warn!("未设置 {}，以匿名身份访问后端", TOKEN_ENV);
    }

    let state = AppState::new(config, token).context("无法初始化AppState")?;
    let api = &state.assignment_api;

    let enterprises = api
        .load_children(&NodeKey::Root)
        .await
        .context("企业列表加载失败")?;
    tracing::info!(count = enterprises.len(), "企业列表已加载");
    for row in &enterprises {
        tracing::info!(key = %row.key, name = %row.name, "企业");
    }

    let groups = api
        .list_grouped(GroupDimension::Enterprise, SortKey::CreatedAt, SortDirection::Desc)
        .await
        .context("派工记录加载失败")?;
    for group in &groups {
        tracing::info!(group = %group.label, count = group.records.len(), "派工分组");
    }

    Ok(())
}
