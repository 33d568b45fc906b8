use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    task::JoinHandle,
    time::{self, Duration},
};
use tracing::{debug, warn};

use crate::{
    error::Error,
    languages::{LanguageConfig, ToolCheck},
    workspace::Workspace,
};

/// How long output readers may keep draining after the process is gone.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

/// Fallback search path for children when the host has none set.
const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Captured result of a supervised child that exited on its own.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Local strategy: compile and run submissions as child processes of this host.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    workspace_root: PathBuf,
    compile_timeout: Duration,
}

impl ProcessExecutor {
    pub fn new(workspace_root: PathBuf, compile_timeout: Duration) -> Self {
        let workspace_root = if workspace_root.is_absolute() {
            workspace_root
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&workspace_root))
                .unwrap_or(workspace_root)
        };
        Self {
            workspace_root,
            compile_timeout,
        }
    }

    /// Run `code` end to end: toolchain check, workspace, optional compile, run.
    /// The workspace is removed before this returns, whatever the outcome.
    pub async fn execute(
        &self,
        config: &LanguageConfig,
        code: &str,
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<String, Error> {
        config.check_tools()?;

        let mut workspace = self.prepare_workspace(code, config).await?;
        let outcome = self.compile_and_run(config, &workspace, input, timeout).await;
        workspace.release().await;
        outcome
    }

    pub async fn prepare_workspace(
        &self,
        code: &str,
        config: &LanguageConfig,
    ) -> Result<Workspace, Error> {
        Workspace::create(&self.workspace_root, config, code).await
    }

    async fn compile_and_run(
        &self,
        config: &LanguageConfig,
        workspace: &Workspace,
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<String, Error> {
        if config.is_compiled() {
            self.compile(config, workspace).await?;
        }
        self.run(config, workspace, input, timeout).await
    }

    /// Compile the workspace source. A no-op for interpreted languages.
    pub async fn compile(&self, config: &LanguageConfig, workspace: &Workspace) -> Result<(), Error> {
        let Some(template) = &config.compile else {
            return Ok(());
        };

        let (program, args) = template.render(&workspace.placeholders());
        let output = supervise(&program, &args, workspace.path(), None, self.compile_timeout).await?;

        if !output.status.success() {
            let diagnostics = if output.stderr.trim().is_empty() {
                output.stdout
            } else {
                output.stderr
            };
            return Err(Error::Compilation(diagnostics));
        }

        debug!("Compiled {} source in workspace {}", config.id, workspace.id());
        Ok(())
    }

    /// Run the program, feeding `input` on stdin, under `timeout`.
    pub async fn run(
        &self,
        config: &LanguageConfig,
        workspace: &Workspace,
        input: Option<&str>,
        timeout: Duration,
    ) -> Result<String, Error> {
        let (program, args) = config.run.render(&workspace.placeholders());
        let output = supervise(&program, &args, workspace.path(), input, timeout).await?;

        if output.status.success() {
            Ok(output.stdout)
        } else if output.stderr.is_empty() {
            Err(Error::Runtime(exit_message(&output.status)))
        } else {
            Err(Error::Runtime(output.stderr))
        }
    }
}

fn exit_message(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("Process exited with code {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Process terminated by signal {}", signal);
        }
    }
    format!("Process exited with status {}", status)
}

fn resolve_program(program: &str) -> Result<PathBuf, Error> {
    let path = Path::new(program);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    which::which(program).map_err(|_| Error::Infrastructure(format!("Command not found: {}", program)))
}

/// Spawn `program` with an argument vector, stream its output, and enforce
/// the deadline. On expiry the whole process group is killed, the readers are
/// drained and [`Error::Timeout`] is returned.
pub(crate) async fn supervise(
    program: &str,
    args: &[String],
    cwd: &Path,
    input: Option<&str>,
    timeout: Duration,
) -> Result<ProcessOutput, Error> {
    let program_path = resolve_program(program)?;

    debug!("Supervise - Command: {:?}", program_path);
    debug!("Supervise - Args: {:?}", args);
    debug!("Supervise - Cwd: {:?}", cwd);

    let mut command = Command::new(&program_path);
    command
        .args(args)
        .env_clear()
        .env(
            "PATH",
            std::env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string()),
        )
        .env("HOME", cwd)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);

    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|e| Error::Infrastructure(format!("Failed to start process: {}", e)))?;
    // Declared after `child` so it drops first, while the leader is unreaped.
    let mut group = ProcessGroup::new(child.id());

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        let data = input.to_owned();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(data.as_bytes()).await {
                // The program may exit without reading its input.
                debug!("Failed to write input: {}", e);
            }
            // Dropping the pipe closes stdin so the program sees EOF.
        });
    }

    let status = match time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            group.kill_survivors();
            Some(status)
        }
        Ok(Err(e)) => {
            group.kill();
            let _ = child.kill().await;
            collect(stdout_reader).await;
            collect(stderr_reader).await;
            return Err(Error::Infrastructure(format!("Process error: {}", e)));
        }
        Err(_) => {
            group.kill();
            if let Err(e) = child.kill().await {
                debug!("Kill after timeout: {}", e);
            }
            None
        }
    };

    let stdout = collect(stdout_reader).await;
    let stderr = collect(stderr_reader).await;

    match status {
        Some(status) => Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        }),
        None => {
            debug!(
                "Process exceeded {:?}; discarded {} bytes of stdout",
                timeout,
                stdout.len()
            );
            Err(Error::Timeout)
        }
    }
}

/// Process group led by a supervised child. Dropping it unsignalled kills
/// the whole group, so an abandoned execution leaves no descendants behind.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    /// Kill the group. Only valid while the leader has not been reaped.
    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_group(pgid);
        }
    }

    /// After the leader was reaped: kill members that are still running.
    /// The group id stays reserved while any member is alive, so the group
    /// is probed first and only signalled if it still exists.
    fn kill_survivors(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            if group_exists(pgid) {
                debug!("Killing processes left behind in group {}", pgid);
                kill_group(pgid);
            }
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

fn spawn_reader<R>(stream: Option<R>) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream.map(|mut stream| {
        tokio::spawn(async move {
            let mut buffer = Vec::new();
            if let Err(e) = stream.read_to_end(&mut buffer).await {
                debug!("Output stream error: {}", e);
            }
            String::from_utf8_lossy(&buffer).into_owned()
        })
    })
}

async fn collect(reader: Option<JoinHandle<String>>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    match time::timeout(OUTPUT_GRACE, &mut reader).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Output reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            reader.abort();
            warn!("Output stream still open {:?} after exit", OUTPUT_GRACE);
            String::new()
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // ESRCH just means the group is already gone.
    let _ = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL);
}

#[cfg(unix)]
fn group_exists(pgid: u32) -> bool {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    killpg(Pid::from_raw(pgid as i32), None).is_ok()
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

#[cfg(not(unix))]
fn group_exists(_pgid: u32) -> bool {
    false
}
