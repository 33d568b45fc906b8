use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, ErrorKind};

/// Largest accepted source, in characters.
pub const MAX_CODE_LENGTH: usize = 50_000;

/// Code execution request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// Language identifier, a key of the language registry
    #[serde(default)]
    pub language: String,
    /// Source code to execute
    #[serde(default)]
    pub code: String,
    /// Data fed to the program's standard input
    #[serde(default)]
    pub input: Option<String>,
    /// Requested deadline; never extends the language's own timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            input: None,
            timeout_ms: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Effective deadline given the language's configured timeout.
    pub fn effective_timeout(&self, language_timeout: Duration) -> Duration {
        match self.timeout_ms {
            Some(ms) => Duration::from_millis(ms).min(language_timeout),
            None => language_timeout,
        }
    }
}

/// Result envelope; every outcome, including rejections, has this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    /// Program stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    /// Wall-clock milliseconds from request receipt to result
    pub execution_time: u64,
    /// Peak memory in kilobytes, when a genuine measurement exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<u64>,
}

impl ExecutionResult {
    pub fn success(output: String, elapsed: Duration) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            error_type: None,
            execution_time: elapsed.as_millis() as u64,
            memory_used: None,
        }
    }

    pub fn failure(error: &Error, elapsed: Duration) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.to_string()),
            error_type: Some(error.kind()),
            execution_time: elapsed.as_millis() as u64,
            memory_used: None,
        }
    }
}

/// Where an execution runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Child process on this host
    #[default]
    Local,
    /// Single-use container task on the cluster
    Remote,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Strategy::Local),
            "remote" => Ok(Strategy::Remote),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}
