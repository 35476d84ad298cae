use async_trait::async_trait;
use futures::stream::Stream;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::error::AdbError;
use crate::locator::AdbLocator;

/// Line-oriented stdout of a spawned process
pub type LineStream = Pin<Box<dyn Stream<Item = std::io::Result<String>> + Send>>;

/// Captured result of a one-shot command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or -1 when terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Control over a running child process
pub trait ProcessHandle: Send + Sync {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Whether the process has exited (best effort)
    fn has_exited(&self) -> bool;

    /// Request termination without waiting for it
    fn terminate(&self);
}

/// A long-running process with its output exposed as lines
pub struct SpawnedProcess {
    pub lines: LineStream,
    pub handle: Arc<dyn ProcessHandle>,
}

impl std::fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.handle.id())
            .finish_non_exhaustive()
    }
}

/// Abstract capability to find and launch the external log tool
#[async_trait]
pub trait ProcessLauncher: Send + Sync + 'static {
    /// Where the tool is expected to live
    fn tool_path(&self) -> PathBuf;

    /// Whether the tool is present at `path`
    fn tool_exists(&self, path: &Path) -> bool;

    /// Start `program` and stream its stdout line by line
    fn spawn_lines(&self, program: &Path, args: &[String]) -> Result<SpawnedProcess, AdbError>;

    /// Run `program` to completion, capturing its output
    async fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, AdbError>;
}

/// Production launcher backed by `tokio::process`
#[derive(Clone, Debug, Default)]
pub struct TokioLauncher {
    locator: AdbLocator,
}

impl TokioLauncher {
    pub fn new(locator: AdbLocator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    fn tool_path(&self) -> PathBuf {
        self.locator.resolve()
    }

    fn tool_exists(&self, path: &Path) -> bool {
        AdbLocator::is_present(path)
    }

    fn spawn_lines(&self, program: &Path, args: &[String]) -> Result<SpawnedProcess, AdbError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AdbError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(AdbError::MissingStdout)?;
        tracing::debug!(pid = ?child.id(), program = %program.display(), "spawned streaming process");

        // `Lines::next_line` is cancel safe, so dropping a pending poll loses nothing
        let lines = futures::stream::unfold(BufReader::new(stdout).lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), lines)),
                Ok(None) => None,
                Err(e) => Some((Err(e), lines)),
            }
        });

        Ok(SpawnedProcess {
            lines: Box::pin(lines),
            handle: Arc::new(TokioProcess::new(child)),
        })
    }

    async fn run(&self, program: &Path, args: &[String]) -> Result<CommandOutput, AdbError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AdbError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Handle over a `tokio::process::Child`
struct TokioProcess {
    child: Mutex<Child>,
    pid: Option<u32>,
}

impl TokioProcess {
    fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Mutex::new(child),
            pid,
        }
    }
}

impl ProcessHandle for TokioProcess {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn has_exited(&self) -> bool {
        // A failed status query means the child can no longer be observed
        !matches!(self.child.lock().try_wait(), Ok(None))
    }

    fn terminate(&self) {
        let mut child = self.child.lock();
        if let Err(e) = child.start_kill() {
            tracing::debug!(pid = ?self.pid, error = %e, "terminate: process already gone");
        }
    }
}
