use serde::{Deserialize, Serialize};

/// Stop code ECS reports when the container never started.
pub const STOP_CODE_FAILED_TO_START: &str = "TaskFailedToStart";

/// Everything needed to register one single-use task definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task definition family, unique per execution
    pub family: String,
    pub image: String,
    /// Container command as an argument vector
    pub command: Vec<String>,
    /// Environment values handed to the container
    pub environment: Vec<(String, String)>,
}

impl TaskSpec {
    pub fn new(image: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            family: format!("code-exec-{}", uuid::Uuid::new_v4().simple()),
            image: image.into(),
            command,
            environment: Vec::new(),
        }
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((name.into(), value.into()));
        self
    }
}

/// `lastStatus` values of an ECS task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    Other(String),
}

impl TaskStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "PROVISIONING" => TaskStatus::Provisioning,
            "PENDING" => TaskStatus::Pending,
            "ACTIVATING" => TaskStatus::Activating,
            "RUNNING" => TaskStatus::Running,
            "DEACTIVATING" => TaskStatus::Deactivating,
            "STOPPING" => TaskStatus::Stopping,
            "DEPROVISIONING" => TaskStatus::Deprovisioning,
            "STOPPED" => TaskStatus::Stopped,
            other => TaskStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Stopped)
    }
}

/// Point-in-time view of a task returned by a status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    pub stop_code: Option<String>,
    pub stopped_reason: Option<String>,
    /// Exit code of the task's container, once it has exited
    pub exit_code: Option<i32>,
}

impl TaskSnapshot {
    /// A stopped task failed if it never started or its container exited non-zero.
    pub fn failed(&self) -> bool {
        self.stop_code.as_deref() == Some(STOP_CODE_FAILED_TO_START) || self.exit_code != Some(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: Option<i64>,
    pub message: String,
}
