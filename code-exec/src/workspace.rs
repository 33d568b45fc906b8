use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    error::Error,
    languages::{LanguageConfig, Placeholders, ARTIFACT_NAME},
};

/// Ephemeral directory owned by exactly one local execution.
///
/// Holds the written source file and any compiled artifact. [`Workspace::release`]
/// removes it; if a workspace is dropped without being released (for example
/// when the owning task panics) the directory is removed synchronously.
pub struct Workspace {
    root_dir: PathBuf,
    source_file: PathBuf,
    entry: String,
    id: String,
    released: bool,
}

impl Workspace {
    /// Create a fresh directory under `parent` and write `code` into it.
    pub async fn create(parent: &Path, config: &LanguageConfig, code: &str) -> Result<Self, Error> {
        let id = Uuid::new_v4().to_string();
        let root_dir = parent.join(format!("exec-{}", id));

        fs::create_dir_all(&root_dir).await.map_err(|e| {
            Error::Infrastructure(format!("Failed to create workspace directory: {}", e))
        })?;

        let mut workspace = Workspace {
            source_file: root_dir.join(config.source_file_name(code)),
            entry: config.entry_name(code),
            root_dir,
            id,
            released: false,
        };

        if let Err(e) = fs::write(&workspace.source_file, code).await {
            workspace.release().await;
            return Err(Error::Infrastructure(format!(
                "Failed to write source file: {}",
                e
            )));
        }

        debug!(
            "Workspace {} prepared at {:?} ({} bytes of source)",
            workspace.id,
            workspace.root_dir,
            code.len()
        );
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.root_dir
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn artifact(&self) -> PathBuf {
        self.root_dir.join(ARTIFACT_NAME)
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Values for rendering the language's command templates in this workspace.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders {
            source: self.source_file.to_string_lossy().into_owned(),
            artifact: self.artifact().to_string_lossy().into_owned(),
            entry: self.entry.clone(),
            workdir: self.root_dir.to_string_lossy().into_owned(),
        }
    }

    /// Remove the directory and everything in it. Failures are logged.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_dir_all(&self.root_dir).await {
            Ok(()) => debug!("Workspace {} removed", self.id),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!("Failed to clean up workspace {}: {}", self.id, e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                error!("Failed to clean up workspace directory: {}", e);
            }
        }
    }
}
