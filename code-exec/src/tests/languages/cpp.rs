use super::*;
use crate::languages::skip_if_not_available;
use crate::tests::fixtures::{code_samples::*, failures::*};

#[tokio::test]
async fn test_cpp_hello() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    test_language_execution("cpp", CPP_HELLO, "Hello from C++!\n").await;
}

#[tokio::test]
async fn test_cpp_syntax_error() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let result = execute_local(ExecutionRequest::new("cpp", CPP_SYNTAX_ERROR)).await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(ErrorKind::CompileError));
    let error = result.error.unwrap();
    assert!(error.starts_with("Compilation Error:\n"));
    assert!(error.contains("error"));
    assert!(result.execution_time > 0);
}
