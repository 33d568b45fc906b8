use super::*;
use crate::languages::skip_if_not_available;
use crate::tests::fixtures::{code_samples::*, failures::*};

#[tokio::test]
async fn test_java_public_class_entry_point() {
    if skip_if_not_available(&["javac", "java"]) {
        return;
    }
    test_language_execution("java", JAVA_SOLVER, "hi\n").await;
}

#[tokio::test]
async fn test_java_default_class() {
    if skip_if_not_available(&["javac", "java"]) {
        return;
    }
    test_language_execution("java", JAVA_DEFAULT_CLASS, "Hello from Java!\n").await;
}

#[tokio::test]
async fn test_java_exit_is_rejected() {
    // Screening happens before any toolchain lookup.
    let result = execute_local(ExecutionRequest::new("java", JAVA_EXIT)).await;
    assert_eq!(result.error_type, Some(ErrorKind::SecurityViolation));
    assert_eq!(
        result.error.as_deref(),
        Some("Security validation failed: System.exit() is not allowed")
    );
}
