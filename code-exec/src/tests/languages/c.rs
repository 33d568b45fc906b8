use super::*;
use crate::languages::skip_if_not_available;
use crate::{ExecutionCoordinator, Settings};
use crate::tests::fixtures::{code_samples::*, failures::*, with_input::*};

#[tokio::test]
async fn test_c_hello() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    test_language_execution("c", C_HELLO, "Hello from C!\n").await;
}

#[tokio::test]
async fn test_c_input() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    test_language_input("c", C_DOUBLE, "21\n", "42\n").await;
}

#[tokio::test]
async fn test_c_compiled_program_times_out() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    test_language_timeout("c", C_SPIN, short_timeout()).await;
}

#[tokio::test]
async fn test_c_compile_deadline() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    let root = tempdir().unwrap();
    let settings = Settings {
        compile_timeout_ms: 1,
        ..test_settings(root.path())
    };

    let result = ExecutionCoordinator::new(settings)
        .execute(ExecutionRequest::new("c", C_HELLO))
        .await;

    assert_eq!(result.error_type, Some(ErrorKind::TimeoutError));
    assert_eq!(leftover_entries(root.path()), 0);
}
