// ==========================================
// BulkFanoutExecutor 集成测试
// ==========================================
// 测试范围:
// 1. 空集合在请求前拒绝
// 2. 全部成功 / 部分失败 / 全部失败的汇总
// 3. 请求顺序、去重、并发上限
// ==========================================

#[path = "helpers/fake_backend.rs"]
mod fake_backend;

use chrono::NaiveDate;
use fake_backend::FakeBackend;
use inspection_dashboard::domain::{AssignmentTemplate, AssignmentType, Priority};
use inspection_dashboard::engine::{BulkFanoutExecutor, EngineError};
use std::sync::Arc;
use std::time::Duration;

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn template() -> AssignmentTemplate {
    AssignmentTemplate::new(AssignmentType::Inspection, "ENG-7")
        .with_priority(Priority::High)
        .with_due_date(NaiveDate::from_ymd_opt(2026, 11, 30).unwrap())
        .with_description("冬季点检")
}

#[tokio::test]
async fn test_empty_selection_rejected_before_any_request() {
    let backend = Arc::new(FakeBackend::new());
    let executor = BulkFanoutExecutor::new(backend.clone(), 4);

    let err = executor
        .execute(&[], &template())
        .await
        .expect_err("空集合应被拒绝");

    assert!(matches!(err, EngineError::ValidationFailure(_)));
    assert!(backend.calls().is_empty(), "不应发起任何请求");
}

#[tokio::test]
async fn test_all_succeed() {
    let backend = Arc::new(FakeBackend::new());
    let executor = BulkFanoutExecutor::new(backend.clone(), 4);

    let result = executor
        .execute(&ids(&["EQ1", "EQ2", "EQ3"]), &template())
        .await
        .expect("执行失败");

    assert_eq!(result.succeeded_count, 3);
    assert_eq!(result.failed_count, 0);
    assert!(result.first_error.is_none());
    assert!(result.is_total_success());
    assert_eq!(result.summary(), "3 / 3 已创建");

    // 每个请求都携带模板字段
    let created = backend.created();
    assert_eq!(created.len(), 3);
    for request in &created {
        assert_eq!(request.assigned_to, "ENG-7");
        assert_eq!(request.assignment_type, AssignmentType::Inspection);
        assert_eq!(request.priority, Priority::High);
        assert_eq!(request.description.as_deref(), Some("冬季点检"));
    }
}

#[tokio::test]
async fn test_partial_failure_reports_first_error_in_request_order() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail_equipment("EQ2", 409, "设备已有进行中的派工");
    backend.fail_equipment("EQ4", 422, "工程师不存在");
    let executor = BulkFanoutExecutor::new(backend.clone(), 2);

    let result = executor
        .execute(&ids(&["EQ1", "EQ2", "EQ3", "EQ4"]), &template())
        .await
        .expect("部分失败不应作为错误返回");

    assert_eq!(result.succeeded_count, 2);
    assert_eq!(result.failed_count, 2);
    assert_eq!(result.first_error.as_deref(), Some("设备已有进行中的派工"));
    assert_eq!(result.succeeded, ids(&["EQ1", "EQ3"]));
    assert_eq!(result.failed_ids(), ids(&["EQ2", "EQ4"]));
    assert_eq!(result.failures[1].detail, "工程师不存在");
    assert!(!result.is_total_success());
    assert!(!result.is_total_failure());

    // 没有回滚：成功的两条留在后端
    assert_eq!(backend.created().len(), 2);
}

#[tokio::test]
async fn test_total_failure() {
    let backend = Arc::new(FakeBackend::new());
    backend.fail_equipment("EQ1", 500, "internal");
    let executor = BulkFanoutExecutor::with_default_concurrency(backend.clone());

    let result = executor
        .execute(&ids(&["EQ1"]), &template())
        .await
        .expect("执行失败");

    assert!(result.is_total_failure());
    assert_eq!(result.first_error.as_deref(), Some("internal"));
    assert_eq!(result.summary(), "0 / 1 已创建");
}

#[tokio::test]
async fn test_requests_issued_in_input_order_and_deduplicated() {
    let backend = Arc::new(FakeBackend::new());
    let executor = BulkFanoutExecutor::new(backend.clone(), 1);

    let result = executor
        .execute(&ids(&["EQ3", "EQ1", "EQ3", "EQ2"]), &template())
        .await
        .expect("执行失败");

    assert_eq!(result.total(), 3);
    assert_eq!(backend.create_calls(), ids(&["EQ3", "EQ1", "EQ2"]));
}

#[tokio::test]
async fn test_concurrency_cap_respected() {
    let backend = Arc::new(FakeBackend::new());
    backend.set_create_delay(Duration::from_millis(15));
    let executor = BulkFanoutExecutor::new(backend.clone(), 3);

    let leaves: Vec<String> = (1..=10).map(|n| format!("EQ{}", n)).collect();
    let result = executor.execute(&leaves, &template()).await.expect("执行失败");

    assert_eq!(result.succeeded_count, 10);
    assert!(backend.max_in_flight() <= 3, "在途请求超过上限");
    assert!(backend.max_in_flight() >= 2, "请求应并发执行");
}

#[tokio::test]
async fn test_zero_concurrency_clamped_to_one() {
    let backend = Arc::new(FakeBackend::new());
    let executor = BulkFanoutExecutor::new(backend, 0);
    assert_eq!(executor.concurrency(), 1);
}
