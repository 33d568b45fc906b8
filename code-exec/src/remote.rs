//! Remote strategy: one single-use container task per execution.
//!
//! Lifecycle of a task: registered, running, stopped, deregistered. Completion
//! is observed by polling, so the poll interval is a lower bound on the
//! latency of every remote execution.

use ecs_runner::{OrchestratorClient, TaskSnapshot, TaskSpec, STOP_CODE_FAILED_TO_START};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

use crate::{
    error::Error,
    languages::{LanguageConfig, Placeholders, ARTIFACT_NAME},
};

/// Returned in place of output when the log stream cannot be read.
pub const LOG_PLACEHOLDER: &str = "Output retrieval failed";

/// Environment value carrying the submitted source into the container.
pub const SOURCE_ENV: &str = "SOURCE_CODE";
/// Environment value carrying the stdin payload into the container.
pub const INPUT_ENV: &str = "INPUT_DATA";

const CONTAINER_WORKDIR: &str = "/tmp";
const TIMEOUT_STOP_REASON: &str = "Execution timeout exceeded";
const ABANDONED_STOP_REASON: &str = "Execution abandoned";

/// Identifies the task definition and the task of one remote execution.
#[derive(Debug)]
pub struct TaskHandle {
    pub definition_arn: String,
    pub task_arn: String,
}

pub struct RemoteTaskOrchestrator {
    client: Arc<dyn OrchestratorClient>,
    poll_interval: Duration,
}

impl RemoteTaskOrchestrator {
    pub fn new(client: Arc<dyn OrchestratorClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Run `code` as a container task and return its log output. The task is
    /// stopped on timeout and its definition is deregistered on every path,
    /// including when this future is dropped before it completes.
    pub async fn execute(
        &self,
        config: &LanguageConfig,
        code: &str,
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<String, Error> {
        let image = config.image.ok_or_else(|| {
            Error::Infrastructure(format!("No container image configured for {}", config.id))
        })?;

        let handle = self
            .submit(image, container_command(config, code), code, input.unwrap_or_default())
            .await?;
        let mut guard = CleanupGuard::new(self.client.clone(), &handle.definition_arn);
        guard.launched(&handle.task_arn);

        let outcome = match self.poll(&handle, timeout).await {
            Ok(_) => Ok(self.fetch_output(&handle).await),
            Err(Error::Runtime(fallback)) => {
                let logs = self.read_logs(&handle).await.ok();
                Err(Error::Runtime(
                    logs.filter(|logs| !logs.trim().is_empty())
                        .unwrap_or(fallback),
                ))
            }
            Err(e) => Err(e),
        };

        self.teardown(handle).await;
        guard.disarm();
        outcome
    }

    /// Register a single-use task definition and launch one task from it.
    pub async fn submit(
        &self,
        image: &str,
        command: Vec<String>,
        code: &str,
        input: &str,
    ) -> Result<TaskHandle, Error> {
        let spec = TaskSpec::new(image, command)
            .with_env(SOURCE_ENV, code)
            .with_env(INPUT_ENV, input);

        let definition_arn = self.client.register_task(&spec).await?;
        let mut guard = CleanupGuard::new(self.client.clone(), &definition_arn);

        let task_arn = match self.client.run_task(&definition_arn).await {
            Ok(task_arn) => task_arn,
            Err(e) => {
                if let Err(cleanup) = self.client.deregister_task(&definition_arn).await {
                    warn!(
                        "Failed to deregister {} after launch failure: {}",
                        definition_arn, cleanup
                    );
                }
                guard.disarm();
                return Err(e.into());
            }
        };
        guard.disarm();

        info!("Launched remote task {} from {}", task_arn, spec.family);
        Ok(TaskHandle {
            definition_arn,
            task_arn,
        })
    }

    /// Wait for the task to stop, querying its status every poll interval.
    ///
    /// A stopped task that failed to start or exited non-zero yields
    /// [`Error::Runtime`]. If `timeout` elapses first the task is stopped and
    /// [`Error::Timeout`] is returned.
    pub async fn poll(&self, handle: &TaskHandle, timeout: Duration) -> Result<TaskSnapshot, Error> {
        let wait = async {
            loop {
                let snapshot = self.client.describe_task(&handle.task_arn).await?;
                debug!("Task {} status {:?}", handle.task_arn, snapshot.status);
                if snapshot.status.is_terminal() {
                    return Ok::<_, Error>(snapshot);
                }
                time::sleep(self.poll_interval).await;
            }
        };

        match time::timeout(timeout, wait).await {
            Ok(Ok(snapshot)) if snapshot.failed() => Err(Error::Runtime(failure_message(&snapshot))),
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(e)) => {
                self.stop(handle, "Status query failed").await;
                Err(e)
            }
            Err(_) => {
                self.stop(handle, TIMEOUT_STOP_REASON).await;
                Err(Error::Timeout)
            }
        }
    }

    /// Log output of the task, or [`LOG_PLACEHOLDER`] if it cannot be read.
    pub async fn fetch_output(&self, handle: &TaskHandle) -> String {
        match self.read_logs(handle).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to retrieve logs for {}: {}", handle.task_arn, e);
                LOG_PLACEHOLDER.to_string()
            }
        }
    }

    /// Deregister the task definition. Failures are logged only.
    pub async fn teardown(&self, handle: TaskHandle) {
        match self.client.deregister_task(&handle.definition_arn).await {
            Ok(()) => debug!("Tore down {}", handle.definition_arn),
            Err(e) => warn!(
                "Failed to deregister task definition {}: {}",
                handle.definition_arn, e
            ),
        }
    }

    async fn read_logs(&self, handle: &TaskHandle) -> Result<String, ecs_runner::Error> {
        let events = self.client.fetch_logs(&handle.task_arn).await?;
        Ok(events
            .into_iter()
            .map(|event| event.message)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn stop(&self, handle: &TaskHandle, reason: &str) {
        if let Err(e) = self.client.stop_task(&handle.task_arn, reason).await {
            warn!("Failed to stop task {}: {}", handle.task_arn, e);
        }
    }
}

/// Stops and deregisters a task whose execution future was dropped before
/// teardown completed, e.g. when the caller disconnects while polling.
struct CleanupGuard {
    client: Arc<dyn OrchestratorClient>,
    definition_arn: Option<String>,
    task_arn: Option<String>,
}

impl CleanupGuard {
    fn new(client: Arc<dyn OrchestratorClient>, definition_arn: &str) -> Self {
        Self {
            client,
            definition_arn: Some(definition_arn.to_string()),
            task_arn: None,
        }
    }

    fn launched(&mut self, task_arn: &str) {
        self.task_arn = Some(task_arn.to_string());
    }

    fn disarm(&mut self) {
        self.definition_arn = None;
        self.task_arn = None;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(definition_arn) = self.definition_arn.take() else {
            return;
        };
        let task_arn = self.task_arn.take();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(
                "No runtime to clean up abandoned task definition {}",
                definition_arn
            );
            return;
        };

        warn!("Execution abandoned, cleaning up {}", definition_arn);
        let client = self.client.clone();
        runtime.spawn(async move {
            if let Some(task_arn) = task_arn {
                if let Err(e) = client.stop_task(&task_arn, ABANDONED_STOP_REASON).await {
                    warn!("Failed to stop abandoned task {}: {}", task_arn, e);
                }
            }
            if let Err(e) = client.deregister_task(&definition_arn).await {
                warn!(
                    "Failed to deregister abandoned task definition {}: {}",
                    definition_arn, e
                );
            }
        });
    }
}

fn failure_message(snapshot: &TaskSnapshot) -> String {
    if snapshot.stop_code.as_deref() == Some(STOP_CODE_FAILED_TO_START) {
        return format!(
            "Task failed to start: {}",
            snapshot.stopped_reason.as_deref().unwrap_or("unknown reason")
        );
    }
    match snapshot.exit_code {
        Some(code) => format!("Task exited with code {}", code),
        None => "Task execution failed".to_string(),
    }
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

fn shell_join((program, args): (String, Vec<String>)) -> String {
    std::iter::once(program)
        .chain(args)
        .map(|arg| shell_quote(&arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Container argument vector for `code`.
///
/// The script is assembled only from the language's fixed templates and the
/// entry-point name; the source and the input reach the container as
/// environment values and are never part of the script text.
pub fn container_command(config: &LanguageConfig, code: &str) -> Vec<String> {
    let values = Placeholders {
        source: format!("{}/{}", CONTAINER_WORKDIR, config.source_file_name(code)),
        artifact: format!("{}/{}", CONTAINER_WORKDIR, ARTIFACT_NAME),
        entry: config.entry_name(code),
        workdir: CONTAINER_WORKDIR.to_string(),
    };

    let mut steps = vec![
        format!("cd {}", CONTAINER_WORKDIR),
        format!(
            "printf '%s' \"${}\" > {}",
            SOURCE_ENV,
            shell_quote(&values.source)
        ),
    ];
    if let Some(compile) = &config.compile {
        steps.push(shell_join(compile.render(&values)));
    }
    steps.push(format!(
        "printf '%s' \"${}\" | {}",
        INPUT_ENV,
        shell_join(config.run.render(&values))
    ));

    vec!["sh".to_string(), "-c".to_string(), steps.join(" && ")]
}
