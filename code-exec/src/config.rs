use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{error::Error, types::Strategy};

/// Runtime settings of the execution coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory under which per-execution workspaces are created
    pub workspace_root: PathBuf,
    /// Deadline for the compile step of compiled languages
    pub compile_timeout_ms: u64,
    /// Interval between remote task status queries
    pub poll_interval_ms: u64,
    /// Preferred strategy; remote applies only to languages with an image
    pub strategy: Strategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("code-exec"),
            compile_timeout_ms: 10_000,
            poll_interval_ms: 1_000,
            strategy: Strategy::Local,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content)
            .map_err(|e| Error::Validation(format!("Invalid settings file: {}", e)))
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn with_workspace_root(mut self, root: PathBuf) -> Self {
        self.workspace_root = root;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}
