//! External engine invocation
//!
//! Both speech engines are independently versioned programs run as
//! child processes. The [`EngineRunner`] trait is the seam between the
//! adapters and the operating system, so tests can substitute a
//! deterministic fake without spawning anything.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::Result;

/// Captured result of one engine invocation
#[derive(Debug)]
pub struct EngineOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Exit code, when the process exited normally
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Capability to run an external engine and capture its output
#[async_trait]
pub trait EngineRunner: Send + Sync {
    /// Run `program` with `args` to completion
    ///
    /// A non-zero exit is reported through [`EngineOutput::success`],
    /// not as an `Err`; only failure to launch or collect the process
    /// is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the process cannot be spawned or awaited
    async fn run(&self, program: &Path, args: &[String]) -> Result<EngineOutput>;
}

/// Runner backed by real child processes
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

#[async_trait]
impl EngineRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<EngineOutput> {
        tracing::debug!(program = %program.display(), ?args, "spawning engine");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(EngineOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
