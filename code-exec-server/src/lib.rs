use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use code_exec::{Error, ExecutionCoordinator, ExecutionRequest, ExecutionResult, LanguageInfo};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            // Malformed bodies still get the execution envelope.
            ServerError::InvalidBody(_) => {
                let error = Error::Validation(self.to_string());
                let result = ExecutionResult::failure(&error, Duration::ZERO);
                (StatusCode::BAD_REQUEST, Json(result)).into_response()
            }
            ServerError::ServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<ExecutionCoordinator>,
}

pub fn create_app(coordinator: ExecutionCoordinator) -> Router {
    let state = AppState {
        coordinator: Arc::new(coordinator),
    };

    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(languages))
        .route("/api/execute", post(execute))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve `app` on an already bound listener.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Starting code execution server on {}", addr);
    }
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;
    serve(listener, app).await
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn languages(State(state): State<AppState>) -> Json<Vec<LanguageInfo>> {
    Json(state.coordinator.languages())
}

async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ExecutionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExecutionResult>), ServerError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected execute request body: {}", rejection.body_text());
        ServerError::InvalidBody(rejection.body_text())
    })?;

    let result = state.coordinator.execute(request).await;

    let status = match result.error_type {
        Some(kind) if kind.is_rejection() => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };

    Ok((status, Json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use code_exec::{ErrorKind, Settings, ToolCheck};
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_app(ExecutionCoordinator::new(Settings::default()))
    }

    async fn post_execute(app: Router, body: String) -> (StatusCode, ExecutionResult) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/execute")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "OK");
        assert!(chrono::DateTime::parse_from_rfc3339(health["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_languages() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/languages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let languages: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(languages.as_array().unwrap().len(), 5);
        assert_eq!(languages[0]["id"], "python");
        assert_eq!(languages[0]["timeoutMs"], 30_000);
    }

    #[tokio::test]
    async fn test_execute() {
        let coordinator = ExecutionCoordinator::new(Settings::default());
        if !coordinator.registry().get("python").unwrap().missing_tools().is_empty() {
            eprintln!("Skipping test: python3 not available");
            return;
        }

        let body = json!({ "language": "python", "code": "print(\"Hello, World!\")" });
        let (status, result) = post_execute(create_app(coordinator), body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("Hello, World!\n"));
    }

    #[tokio::test]
    async fn test_security_rejection_is_bad_request() {
        let body = json!({ "language": "python", "code": "import os\nprint(os.listdir())" });
        let (status, result) = post_execute(test_app(), body.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(result.error_type, Some(ErrorKind::SecurityViolation));
    }

    #[tokio::test]
    async fn test_missing_code_is_bad_request() {
        let (status, result) =
            post_execute(test_app(), json!({ "language": "python" }).to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(result.error.as_deref(), Some("Language and code are required"));
    }

    #[tokio::test]
    async fn test_malformed_body_gets_envelope() {
        let (status, result) = post_execute(test_app(), "{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!result.success);
        assert_eq!(result.error_type, Some(ErrorKind::ValidationError));
    }

    #[tokio::test]
    async fn test_serve_on_ephemeral_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, test_app()));

        let response = reqwest::Client::new()
            .get(format!("http://{}/api/health", addr))
            .header("origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
