use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::debug;

use crate::types::{status_label, CheckOutput, STATUS_UNKNOWN};

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// A diagnostic capability that produces a [`CheckOutput`] when executed.
///
/// The trait is infallible on purpose: every failure mode (spawn error,
/// timeout, signal) is encoded into the returned output's `status` and
/// `output` text, so a scheduler can publish it like any other result.
/// Implementations are expected to bound their own execution time; callers
/// impose no timeout of their own.
#[async_trait]
pub trait Check: Send + Sync {
    /// Run the diagnostic once and return its captured result.
    async fn execute(&self) -> CheckOutput;
}

// ---------------------------------------------------------------------------
// ExternalCheck
// ---------------------------------------------------------------------------

/// A [`Check`] that runs a configured command line through the platform
/// shell, capturing stdout/stderr, the exit status, and timing.
///
/// The command is a single string (`"check-disk -w 80"`, pipelines allowed)
/// handed to `sh -c` on unix and `cmd /C` on windows, which matches how
/// check commands are written in monitoring configurations.
pub struct ExternalCheck {
    command: String,
    timeout: Option<Duration>,
}

impl ExternalCheck {
    /// Create a check bound to the given command line, with no timeout.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
        }
    }

    /// Bound execution time. On expiry the child process is killed and the
    /// result reports the timeout with the unknown status.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    #[cfg(unix)]
    fn shell_command(&self) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        cmd
    }

    #[cfg(windows)]
    fn shell_command(&self) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&self.command);
        cmd
    }
}

#[async_trait]
impl Check for ExternalCheck {
    async fn execute(&self) -> CheckOutput {
        enum Outcome {
            Finished(std::io::Result<std::process::Output>),
            TimedOut(Duration),
        }

        let started = Instant::now();

        let mut cmd = self.shell_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // With a timeout configured, dropping the output future kills the
        // child via kill_on_drop.
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => Outcome::Finished(result),
                Err(_) => Outcome::TimedOut(limit),
            },
            None => Outcome::Finished(cmd.output().await),
        };

        let duration = started.elapsed().as_secs_f64();
        let executed = Utc::now().timestamp();

        let (output, status) = match outcome {
            Outcome::Finished(Ok(out)) => {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                if !out.stderr.is_empty() {
                    text.push_str(&String::from_utf8_lossy(&out.stderr));
                }
                // Signal-terminated processes report no exit code.
                let status = out.status.code().unwrap_or(STATUS_UNKNOWN);
                (text, status)
            }
            Outcome::Finished(Err(err)) => (
                format!("failed to execute command: {err}"),
                STATUS_UNKNOWN,
            ),
            Outcome::TimedOut(limit) => (
                format!("check timed out after {:.1}s", limit.as_secs_f64()),
                STATUS_UNKNOWN,
            ),
        };

        debug!(
            command = %self.command,
            status,
            severity = status_label(status),
            duration_secs = duration,
            "external check finished"
        );

        CheckOutput {
            output,
            duration,
            status,
            executed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
