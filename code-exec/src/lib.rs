//! # Code Execution
//!
//! Runs untrusted source code in one of several languages and reports the
//! captured output, timing and a structured error classification. Requests
//! are screened before anything is spawned, then executed either as a local
//! child process in a throwaway workspace or as a single-use container task
//! on a cluster.

mod config;
mod error;
mod executor;
mod languages;
mod remote;
mod security;
mod service;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use config::Settings;
pub use error::{Error, ErrorKind};
pub use executor::{ProcessExecutor, ProcessOutput};
pub use languages::{
    toolchain_report, CommandTemplate, EntryPoint, LanguageConfig, LanguageInfo,
    LanguageRegistry, Placeholders, ToolCheck, ToolStatus,
};
pub use remote::{container_command, RemoteTaskOrchestrator, TaskHandle, LOG_PLACEHOLDER};
pub use security::{ScreenReport, SecurityScreener, Violation};
pub use service::ExecutionCoordinator;
pub use types::{ExecutionRequest, ExecutionResult, Strategy, MAX_CODE_LENGTH};
pub use workspace::Workspace;

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
