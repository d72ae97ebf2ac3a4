// ==========================================
// 设备点检管理驾驶舱 - REST 后端实现
// ==========================================
// 职责: 基于 reqwest 实现 HierarchySource / AssignmentBackend
// 接口:
//   GET  /enterprises
//   GET  /enterprises/{id}/branches
//   GET  /branches/{id}/workshops
//   GET  /workshops/{id}/equipment
//   POST /assignments
//   GET  /assignments
// ==========================================

use crate::domain::assignment::{AssignmentRecord, CreateAssignmentRequest, CreatedAssignment};
use crate::domain::hierarchy::HierarchyEntry;
use crate::transport::backend_trait::{AssignmentBackend, HierarchySource};
use crate::transport::context::RequestContext;
use crate::transport::error::{TransportError, TransportResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

// ==========================================
// HttpBackend
// ==========================================
pub struct HttpBackend {
    client: Client,
    context: RequestContext,
}

impl HttpBackend {
    /// 创建 REST 后端
    ///
    /// # 参数
    /// - context: 请求上下文（地址/令牌/超时）
    pub fn new(context: RequestContext) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(context.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("HTTP 客户端初始化失败: {}", e)))?;

        Ok(Self { client, context })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// 拼接接口地址，路径段逐段编码
    fn endpoint(&self, segments: &[&str]) -> TransportResult<Url> {
        let mut url = Url::parse(&self.context.base_url)
            .map_err(|e| TransportError::Network(format!("后端地址无效: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Network("后端地址不能作为根路径".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.context.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> TransportResult<T> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET");

        let response = self.authorize(self.client.get(url)).send().await?;
        decode(response).await
    }

    async fn list_level(&self, segments: &[&str]) -> TransportResult<Vec<HierarchyEntry>> {
        self.get_json(segments).await
    }
}

#[async_trait]
impl HierarchySource for HttpBackend {
    async fn list_enterprises(&self) -> TransportResult<Vec<HierarchyEntry>> {
        self.list_level(&["enterprises"]).await
    }

    async fn list_branches(&self, enterprise_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.list_level(&["enterprises", enterprise_id, "branches"]).await
    }

    async fn list_workshops(&self, branch_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.list_level(&["branches", branch_id, "workshops"]).await
    }

    async fn list_equipment(&self, workshop_id: &str) -> TransportResult<Vec<HierarchyEntry>> {
        self.list_level(&["workshops", workshop_id, "equipment"]).await
    }
}

#[async_trait]
impl AssignmentBackend for HttpBackend {
    async fn create_assignment(
        &self,
        request: &CreateAssignmentRequest,
    ) -> TransportResult<Option<CreatedAssignment>> {
        let url = self.endpoint(&["assignments"])?;
        debug!(url = %url, equipment_id = %request.equipment_id, "POST");

        let response = self
            .authorize(self.client.post(url).json(request))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        // 2xx 即已落库，响应体只用于取记录ID
        match response.bytes().await {
            Ok(body) => Ok(parse_created(&body)),
            Err(e) => {
                warn!(equipment_id = %request.equipment_id, error = %e, "派工响应体读取失败");
                Ok(None)
            }
        }
    }

    async fn list_assignments(&self) -> TransportResult<Vec<AssignmentRecord>> {
        self.get_json(&["assignments"]).await
    }
}

// ==========================================
// 响应处理
// ==========================================

/// 非 2xx 统一转为 TransportError::Status
async fn ensure_success(response: Response) -> TransportResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    warn!(status = status.as_u16(), detail = %detail, "后端返回错误");
    Err(TransportError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> TransportResult<T> {
    ensure_success(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))
}

/// 尽力解析创建响应中的记录ID
///
/// 空响应体（201/204）或其他结构返回 None，不影响成功判定
pub(crate) fn parse_created(body: &[u8]) -> Option<CreatedAssignment> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<CreatedAssignment>(body) {
        Ok(created) => Some(created),
        Err(e) => {
            debug!(error = %e, "创建响应不含记录ID");
            None
        }
    }
}

/// 提取错误体中的 `detail`
///
/// - 字符串: 原样返回
/// - 结构化（如字段校验列表）: 紧凑 JSON
/// - 非 JSON 或无 detail: 原始响应体
/// - 空响应体: None
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        _ => Some(trimmed.to_string()),
    }
}
