use super::*;
use crate::languages::skip_if_not_available;
use crate::tests::fixtures::{code_samples::*, failures::*, with_input::*};

#[tokio::test]
async fn test_javascript_hello() {
    if skip_if_not_available(&["node"]) {
        return;
    }
    test_language_execution("javascript", JS_HELLO, "Hello from JavaScript!\n").await;
}

#[tokio::test]
async fn test_javascript_input() {
    if skip_if_not_available(&["node"]) {
        return;
    }
    test_language_input("javascript", JS_SUM_LINES, "1\n2\n3\n", "6\n").await;
}

#[tokio::test]
async fn test_javascript_busy_loop_times_out() {
    if skip_if_not_available(&["node"]) {
        return;
    }
    test_language_timeout("javascript", JS_BUSY_LOOP, short_timeout()).await;
}
