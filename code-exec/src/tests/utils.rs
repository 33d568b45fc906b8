pub mod defaults {
    use crate::{ExecutionCoordinator, Settings};
    use std::path::Path;
    use tokio::time::Duration;

    pub fn test_settings(workspace_root: &Path) -> Settings {
        Settings::default().with_workspace_root(workspace_root.to_path_buf())
    }

    pub fn local_coordinator(workspace_root: &Path) -> ExecutionCoordinator {
        ExecutionCoordinator::new(test_settings(workspace_root))
    }

    pub fn default_timeout() -> Duration {
        Duration::from_secs(10)
    }

    pub fn short_timeout() -> Duration {
        Duration::from_secs(2)
    }
}

pub mod workspaces {
    use std::path::Path;

    /// Number of entries left under a workspace root.
    pub fn leftover_entries(root: &Path) -> usize {
        match std::fs::read_dir(root) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}
