//! Shell command execution for build steps

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::CommandError;

/// Number of trailing stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Capability to run shell commands on behalf of the builder
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and return its captured standard output
    async fn run(&self, command: &str) -> Result<String, CommandError>;

    /// Run a command, streaming its output as it is produced
    async fn run_and_print(&self, command: &str) -> Result<(), CommandError>;
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for Arc<T> {
    async fn run(&self, command: &str) -> Result<String, CommandError> {
        (**self).run(command).await
    }

    async fn run_and_print(&self, command: &str) -> Result<(), CommandError> {
        (**self).run_and_print(command).await
    }
}

/// Where streamed command output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The child writes straight to this process's stdout/stderr
    #[default]
    Inherit,
    /// Each output line is re-emitted through `tracing`
    Log,
}

/// Shell executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Shell used to interpret commands (invoked as `<shell> -c <command>`)
    pub shell: String,
    /// Working directory for spawned commands
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
    /// Destination for `run_and_print` output
    pub output: OutputMode,
    /// Per-command timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            working_dir: None,
            env: HashMap::new(),
            output: OutputMode::default(),
            timeout_seconds: None,
        }
    }
}

/// Executor that runs commands through the host shell
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    config: ExecutorConfig,
}

impl ShellExecutor {
    /// Create a new shell executor
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.config.shell);
        cmd.arg("-c").arg(command).stdin(Stdio::null()).kill_on_drop(true);

        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.config.env);

        cmd
    }

    /// Apply the configured timeout; the child is killed when its future is dropped
    async fn with_timeout<T, F>(&self, command: &str, fut: F) -> Result<T, CommandError>
    where
        F: Future<Output = Result<T, CommandError>>,
    {
        let Some(secs) = self.config.timeout_seconds else {
            return fut.await;
        };

        let duration = Duration::from_secs(secs);
        match tokio::time::timeout(duration, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Command timed out after {:?}: {}", duration, command);
                Err(CommandError::Timeout { command: command.to_string(), duration })
            }
        }
    }

    async fn stream_inherited(&self, command: &str) -> Result<(), CommandError> {
        let status = self
            .command(command)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| CommandError::Spawn { command: command.to_string(), source })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::failed(command, status.code(), ""))
        }
    }

    async fn stream_logged(&self, command: &str) -> Result<(), CommandError> {
        let mut child = self
            .command(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CommandError::Spawn { command: command.to_string(), source })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, _, stderr_tail) =
            tokio::join!(child.wait(), forward_lines(stdout, false), forward_lines(stderr, true));

        let status =
            status.map_err(|source| CommandError::Spawn { command: command.to_string(), source })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::failed(command, status.code(), Vec::from(stderr_tail).join("\n")))
        }
    }
}

/// Re-emit each line of a child stream through `tracing`, returning the last
/// few lines when `keep_tail` is set.
async fn forward_lines<R>(stream: Option<R>, keep_tail: bool) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(if keep_tail { STDERR_TAIL_LINES } else { 0 });
    let Some(stream) = stream else {
        return tail;
    };

    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                info!("{}", line);
                if keep_tail {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading command output: {}", e);
                break;
            }
        }
    }

    tail
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> Result<String, CommandError> {
        debug!("Running: {}", command);

        let output = self
            .with_timeout(command, async {
                self.command(command)
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(|source| CommandError::Spawn { command: command.to_string(), source })
            })
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if !stderr.is_empty() {
                debug!("Command stderr: {}", stderr);
            }
            return Err(CommandError::failed(command, output.status.code(), stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_and_print(&self, command: &str) -> Result<(), CommandError> {
        debug!("Running: {}", command);

        match self.config.output {
            OutputMode::Inherit => {
                self.with_timeout(command, self.stream_inherited(command)).await
            }
            OutputMode::Log => self.with_timeout(command, self.stream_logged(command)).await,
        }
    }
}
