// ==========================================
// 设备点检管理驾驶舱 - 应用状态
// ==========================================
// 职责: 管理会话级别的共享状态和API实例
// 说明: 会话结束即丢弃，不做任何持久化
// ==========================================

use std::sync::Arc;

use crate::api::{ApiResult, AssignmentApi};
use crate::config::DashboardConfig;
use crate::engine::HierarchyStore;
use crate::transport::{AssignmentBackend, HierarchySource, HttpBackend};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 生效配置
    pub config: DashboardConfig,

    /// 派工API
    pub assignment_api: Arc<AssignmentApi>,
}

impl AppState {
    /// 创建新的AppState实例（HTTP 后端）
    ///
    /// # 参数
    /// - config: 已校验的配置
    /// - bearer_token: 认证协作方提供的会话令牌（可选）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(ApiError): 配置无效或 HTTP 客户端初始化失败
    pub fn new(config: DashboardConfig, bearer_token: Option<String>) -> ApiResult<Self> {
        config.validate()?;
        tracing::info!(
            base_url = %config.api_base_url,
            concurrency = config.fanout_concurrency,
            "初始化AppState"
        );

        let mut context = config.request_context();
        if let Some(token) = bearer_token {
            context = context.with_token(token);
        }

        let backend = Arc::new(HttpBackend::new(context)?);
        Ok(Self::with_backends(config, backend.clone(), backend))
    }

    /// 使用指定后端组装（测试替身或其他传输实现）
    pub fn with_backends(
        config: DashboardConfig,
        hierarchy: Arc<dyn HierarchySource>,
        assignments: Arc<dyn AssignmentBackend>,
    ) -> Self {
        let store = Arc::new(HierarchyStore::new(hierarchy));
        let assignment_api = Arc::new(AssignmentApi::new(
            store,
            assignments,
            config.fanout_concurrency,
        ));

        Self {
            config,
            assignment_api,
        }
    }
}
