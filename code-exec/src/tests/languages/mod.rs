use super::utils::{defaults::*, workspaces::leftover_entries};
use crate::{ErrorKind, ExecutionRequest, ExecutionResult};
use tempfile::tempdir;
use tokio::time::Duration;

pub mod c;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

/// Execute one request locally and check that no workspace was left behind.
pub(crate) async fn execute_local(request: ExecutionRequest) -> ExecutionResult {
    let root = tempdir().unwrap();
    let coordinator = local_coordinator(root.path());
    let result = coordinator.execute(request).await;
    assert_eq!(leftover_entries(root.path()), 0, "workspace not released");
    result
}

pub(crate) async fn test_language_execution(language: &str, code: &str, expected: &str) {
    let request = ExecutionRequest::new(language, code).with_timeout(default_timeout());
    let result = execute_local(request).await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.output.as_deref(), Some(expected));
    assert!(result.error_type.is_none());
}

pub(crate) async fn test_language_input(language: &str, code: &str, input: &str, expected: &str) {
    let request = ExecutionRequest::new(language, code)
        .with_input(input)
        .with_timeout(default_timeout());
    let result = execute_local(request).await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.output.as_deref(), Some(expected));
}

pub(crate) async fn test_language_timeout(language: &str, code: &str, timeout: Duration) {
    let request = ExecutionRequest::new(language, code).with_timeout(timeout);
    let result = execute_local(request).await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::TimeoutError));
    assert_eq!(result.error.as_deref(), Some("Execution timeout exceeded"));
    assert!(result.execution_time >= timeout.as_millis() as u64);
    assert!(result.output.is_none());
}
