//! Process execution for package manager CLIs
//!
//! This module provides:
//! - The `ProcessRunner` trait plugins use to invoke external tooling
//! - `SystemProcessRunner`, which spawns real processes via tokio
//!
//! A runner never returns an error: spawn failures, timeouts and non-zero
//! exits are all reported through a populated `ExecResult`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::pin;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Exit code reported when the command could not be spawned
pub const EXIT_CODE_SPAWN_FAILURE: i32 = 127;

/// Exit code reported when the command was killed after its timeout
pub const EXIT_CODE_TIMEOUT: i32 = 124;

/// Exit code reported when the process ended without a code (e.g. a signal)
const EXIT_CODE_UNKNOWN: i32 = 1;

/// How long pipes may stay open once the child has exited or been killed
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Options for a single command execution
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory override
    pub cwd: Option<PathBuf>,
    /// Variables merged over the inherited environment (overrides win)
    pub env: HashMap<String, String>,
    /// Hard wall-clock limit; the process is killed when it elapses
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add several environment overrides, replacing existing keys
    pub fn with_envs(mut self, vars: &HashMap<String, String>) -> Self {
        self.env
            .extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Captured result of a command execution
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Standard output, whitespace-trimmed
    pub stdout: String,
    /// Standard error, whitespace-trimmed; carries the failure message if the
    /// command failed without writing anything to stderr
    pub stderr: String,
    /// 0 on success
    pub exit_code: i32,
    /// Whether the process was killed because the timeout elapsed
    pub timed_out: bool,
}

impl ExecResult {
    /// Create a result from already-captured output
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: stdout.into().trim().to_string(),
            stderr: stderr.into().trim().to_string(),
            exit_code,
            timed_out: false,
        }
    }

    /// Whether the command exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// Result for a command that could not be started
    fn spawn_failure(command: &str, err: &std::io::Error) -> Self {
        Self::new(
            String::new(),
            format!("failed to spawn `{}`: {}", command, err),
            EXIT_CODE_SPAWN_FAILURE,
        )
    }
}

/// Trait for running external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Execute `command` with `args`, never failing on command-level errors
    async fn exec(&self, command: &str, args: &[String], options: &ExecOptions) -> ExecResult;
}

/// Runner that spawns real processes
#[derive(Debug, Default, Clone)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    /// Create a new system process runner
    pub fn new() -> Self {
        Self
    }

    /// Build the command; arguments are passed through without a shell
    fn build_command(command: &str, args: &[String], options: &ExecOptions) -> Command {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn exec(&self, command: &str, args: &[String], options: &ExecOptions) -> ExecResult {
        let command_line = display_command(command, args);
        tracing::debug!(command = %command_line, cwd = ?options.cwd, "spawning process");

        let mut child = match Self::build_command(command, args, options).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(command = %command_line, error = %e, "failed to spawn process");
                return ExecResult::spawn_failure(command, &e);
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let (status, timed_out) = {
            let wait = async {
                match options.timeout {
                    Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                        Ok(status) => (status, false),
                        Err(_) => {
                            let _ = child.kill().await;
                            (child.wait().await, true)
                        }
                    },
                    None => (child.wait().await, false),
                }
            };
            let drain = async {
                tokio::join!(
                    drain_pipe(stdout, &mut stdout_buf),
                    drain_pipe(stderr, &mut stderr_buf)
                );
            };
            let mut wait = pin!(wait);
            let mut drain = pin!(drain);

            // Pipes are drained while waiting so a chatty child cannot block
            // on a full buffer.
            let mut drained = false;
            let outcome = loop {
                tokio::select! {
                    outcome = &mut wait => break outcome,
                    _ = &mut drain, if !drained => drained = true,
                }
            };

            // A descendant that inherited the pipes can keep them open after
            // the child is gone; reads are cut off after a grace period.
            if !drained && tokio::time::timeout(PIPE_DRAIN_GRACE, &mut drain).await.is_err() {
                tracing::debug!(
                    command = %command_line,
                    "pipes still open after exit, keeping partial output"
                );
            }
            outcome
        };

        let result = finish(
            &command_line,
            status,
            timed_out,
            options.timeout,
            String::from_utf8_lossy(&stdout_buf).into_owned(),
            String::from_utf8_lossy(&stderr_buf).into_owned(),
        );
        tracing::debug!(
            command = %command_line,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            "process finished"
        );
        result
    }
}

/// Turn the raw process outcome into an `ExecResult`
fn finish(
    command_line: &str,
    status: std::io::Result<ExitStatus>,
    timed_out: bool,
    timeout: Option<Duration>,
    stdout: String,
    stderr: String,
) -> ExecResult {
    let stdout = stdout.trim().to_string();
    let stderr = stderr.trim().to_string();

    let (exit_code, failure) = if timed_out {
        let limit = timeout.unwrap_or_default();
        (
            EXIT_CODE_TIMEOUT,
            Some(format!("`{}` timed out after {:?}", command_line, limit)),
        )
    } else {
        match status {
            Ok(status) if status.success() => (0, None),
            Ok(status) => {
                let code = status.code().unwrap_or(EXIT_CODE_UNKNOWN);
                (
                    code,
                    Some(format!("`{}` exited with status {}", command_line, status)),
                )
            }
            Err(e) => (
                EXIT_CODE_UNKNOWN,
                Some(format!("failed to wait for `{}`: {}", command_line, e)),
            ),
        }
    };

    let stderr = match failure {
        Some(message) if stderr.is_empty() => message,
        _ => stderr,
    };

    ExecResult {
        stdout,
        stderr,
        exit_code,
        timed_out,
    }
}

/// Append everything read from `pipe` to `buf`. Bytes already read stay in
/// `buf` if the future is dropped part-way.
async fn drain_pipe<R>(pipe: Option<R>, buf: &mut Vec<u8>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Render a command line for logs and error messages
pub fn display_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}
