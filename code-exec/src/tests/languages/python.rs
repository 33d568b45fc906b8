use super::*;
use crate::languages::skip_if_not_available;
use crate::tests::fixtures::{code_samples::*, failures::*, with_input::*};

#[tokio::test]
async fn test_python_hello() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    test_language_execution("python", PYTHON_HELLO, "Hello, World!\n").await;
}

#[tokio::test]
async fn test_python_empty_input() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    test_language_input("python", PYTHON_HELLO, "", "Hello, World!\n").await;
}

#[tokio::test]
async fn test_python_input() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    test_language_input("python", PYTHON_ECHO_NAME, "test user\n", "Hello, test user!\n").await;
}

#[tokio::test]
async fn test_python_runtime_error_carries_stderr() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let result = execute_local(ExecutionRequest::new("python", PYTHON_RAISE)).await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::RuntimeError));
    assert!(result.error.unwrap().contains("ValueError: boom"));
}

#[tokio::test]
async fn test_python_silent_exit_reports_code() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let result = execute_local(ExecutionRequest::new("python", PYTHON_EXIT_SILENT)).await;
    assert_eq!(result.error_type, Some(ErrorKind::RuntimeError));
    assert_eq!(result.error.as_deref(), Some("Process exited with code 3"));
}

#[tokio::test]
async fn test_python_timeout() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    test_language_timeout("python", "while True:\n    pass", short_timeout()).await;
}
