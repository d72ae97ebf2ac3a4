// ==========================================
// 设备点检管理驾驶舱 - 批量派工执行器
// ==========================================
// 职责: 每台选中设备独立发起一次创建请求，汇总结果
// 红线:
// - 空集合在任何网络请求之前拒绝
// - 不重试、不回滚：部分失败时后端只保留成功的那部分
// - 部分/全部失败以 FanoutResult 返回，不作为错误抛出
// ==========================================

use crate::domain::assignment::{AssignmentTemplate, CreateAssignmentRequest, FanoutResult, LeafFailure};
use crate::engine::error::{EngineError, EngineResult};
use crate::transport::backend_trait::AssignmentBackend;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn, Span};
use uuid::Uuid;

/// 默认并发上限
pub const DEFAULT_FANOUT_CONCURRENCY: usize = 8;

// ==========================================
// BulkFanoutExecutor
// ==========================================
pub struct BulkFanoutExecutor {
    backend: Arc<dyn AssignmentBackend>,
    concurrency: usize,
}

impl BulkFanoutExecutor {
    /// 创建执行器
    ///
    /// # 参数
    /// - backend: 派工创建接口
    /// - concurrency: 同时在途的创建请求上限（最小为 1）
    pub fn new(backend: Arc<dyn AssignmentBackend>, concurrency: usize) -> Self {
        Self {
            backend,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_default_concurrency(backend: Arc<dyn AssignmentBackend>) -> Self {
        Self::new(backend, DEFAULT_FANOUT_CONCURRENCY)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 批量创建派工
    ///
    /// 请求按输入顺序发出，最多 `concurrency` 个同时在途；结果按输入顺序汇总，
    /// 所以 `first_error` 在给定输入下是确定的。重复的设备ID只保留第一次出现。
    ///
    /// # 参数
    /// - leaf_ids: 设备ID集合（非空）
    /// - template: 派工模板
    ///
    /// # 返回
    /// - Ok(FanoutResult): 全部请求结束后的汇总
    /// - Err(EngineError::ValidationFailure): 空集合，未发起任何请求
    #[instrument(skip(self, leaf_ids, template), fields(batch_id))]
    pub async fn execute(
        &self,
        leaf_ids: &[String],
        template: &AssignmentTemplate,
    ) -> EngineResult<FanoutResult> {
        if leaf_ids.is_empty() {
            return Err(EngineError::ValidationFailure(
                "请至少选择一个设备".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(leaf_ids.len());
        let requests: Vec<CreateAssignmentRequest> = leaf_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| CreateAssignmentRequest::from_template(id.as_str(), template))
            .collect();

        let batch_id = Uuid::new_v4().to_string();
        Span::current().record("batch_id", batch_id.as_str());
        info!(
            batch_id = %batch_id,
            total = requests.len(),
            concurrency = self.concurrency,
            assignment_type = %template.assignment_type,
            "开始批量派工"
        );

        // 按输入顺序发出，最多 concurrency 个同时在途
        let backend = &self.backend;
        let outcomes: Vec<_> = stream::iter(requests)
            .map(|request| async move {
                let outcome = backend.create_assignment(&request).await;
                (request.equipment_id, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut result = FanoutResult::default();
        for (equipment_id, outcome) in outcomes {
            match outcome {
                Ok(_) => {
                    result.succeeded_count += 1;
                    result.succeeded.push(equipment_id);
                }
                Err(err) => {
                    let detail = err.detail();
                    warn!(equipment_id = %equipment_id, error = %err, "派工创建失败");
                    if result.first_error.is_none() {
                        result.first_error = Some(detail.clone());
                    }
                    result.failed_count += 1;
                    result.failures.push(LeafFailure {
                        equipment_id,
                        detail,
                    });
                }
            }
        }

        info!(
            batch_id = %batch_id,
            succeeded = result.succeeded_count,
            failed = result.failed_count,
            "批量派工结束"
        );
        Ok(result)
    }
}
