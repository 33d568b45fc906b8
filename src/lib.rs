//! Client for the online compiler HTTP API.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub use code_exec::{ErrorKind, ExecutionRequest, ExecutionResult};

/// Default address of a locally running server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// Longest language timeout plus room for compilation and transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Language entry as listed by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: String,
    pub name: String,
    pub extension: String,
    pub timeout_ms: u64,
    pub compiled: bool,
}

#[derive(Debug, Deserialize)]
struct Health {
    status: String,
}

pub struct CompilerClient {
    client: Client,
    base_url: String,
}

impl CompilerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Submit code for execution. Rejected requests still return the result
    /// envelope; only transport failures are errors.
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, Error> {
        let response = self
            .client
            .post(format!("{}/api/execute", self.base_url))
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::BAD_REQUEST => Ok(response.json().await?),
            status => Err(Error::Api {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    pub async fn languages(&self) -> Result<Vec<Language>, Error> {
        let response = self
            .client
            .get(format!("{}/api/languages", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Whether the server reports itself healthy.
    pub async fn health(&self) -> Result<bool, Error> {
        let health: Health = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(health.status == "OK")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status_code}): {message}")]
    Api { status_code: u16, message: String },
}

/// Guess a language id from a file extension.
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "py" => Some("python"),
        "js" | "mjs" => Some("javascript"),
        "c" => Some("c"),
        "cpp" | "cc" | "cxx" => Some("cpp"),
        "java" => Some("java"),
        _ => None,
    }
}
