//! External process execution for the scan script and the status probe

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;

use super::request::ScanRequest;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, for reporting failed runs
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Run a program to completion, killing it if it outlives `timeout`
pub async fn run_command<S: AsRef<OsStr>>(
    program: S,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, RunError> {
    let program = program.as_ref();
    let start = Instant::now();

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
            duration: start.elapsed(),
        }),
        Ok(Err(e)) => Err(RunError::Io(e)),
        Err(_) => Err(RunError::Timeout(timeout.as_secs())),
    }
}

/// Invokes the scan script with request-derived arguments
#[derive(Debug, Clone)]
pub struct ScanRunner {
    script: PathBuf,
    timeout: Duration,
}

impl ScanRunner {
    pub fn new(script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            script: script.into(),
            timeout,
        }
    }

    /// Whether the configured script exists as a regular file
    pub fn script_available(&self) -> bool {
        self.script.is_file()
    }

    pub async fn run(&self, request: &ScanRequest) -> Result<CommandOutput, RunError> {
        let args = request.to_args();
        tracing::info!("Running {} {}", self.script.display(), args.join(" "));

        let output = run_command(&self.script, &args, self.timeout).await?;

        if output.success() {
            tracing::info!("Scan script finished in {:?}", output.duration);
        } else {
            tracing::warn!(
                "Scan script exited with {:?} after {:?}: {}",
                output.code,
                output.duration,
                output.stderr.trim()
            );
        }

        Ok(output)
    }
}
