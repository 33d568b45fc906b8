use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::security::Violation;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Security validation failed: {}", join_violations(.0))]
    SecurityViolation(Vec<Violation>),

    #[error("Compilation Error:\n{0}")]
    Compilation(String),

    #[error("{0}")]
    Runtime(String),

    #[error("Execution timeout exceeded")]
    Timeout,

    #[error("{0}")]
    Infrastructure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::ValidationError,
            Error::SecurityViolation(_) => ErrorKind::SecurityViolation,
            Error::Compilation(_) => ErrorKind::CompileError,
            Error::Runtime(_) => ErrorKind::RuntimeError,
            Error::Timeout => ErrorKind::TimeoutError,
            Error::Infrastructure(_) | Error::Io(_) => ErrorKind::InfrastructureError,
        }
    }
}

impl From<ecs_runner::Error> for Error {
    fn from(err: ecs_runner::Error) -> Self {
        Error::Infrastructure(format!("Remote execution failed: {}", err))
    }
}

/// Failure classification carried in the result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    SecurityViolation,
    CompileError,
    RuntimeError,
    TimeoutError,
    InfrastructureError,
}

impl ErrorKind {
    /// Rejections caused by the request itself rather than by running it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ErrorKind::ValidationError | ErrorKind::SecurityViolation)
    }
}
