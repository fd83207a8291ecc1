//! Subprocess stage.
//!
//! Spawns the configured program, streams the input to its stdin, and
//! collects stdout as the stage output. Stderr is kept apart as diagnostics.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{Stage, StageFailure};
use crate::config::StageCommand;

/// Stage backed by an external program
#[derive(Debug, Clone)]
pub struct CommandStage {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandStage {
    /// Create a stage running `program` with no arguments
    pub fn new(name: impl Into<String>, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Create a stage from a configured command
    pub fn from_command(name: impl Into<String>, command: &StageCommand, timeout: Duration) -> Self {
        Self::new(name, command.program.clone(), timeout).with_args(command.args.clone())
    }

    /// Append command-line arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: &[u8]) -> Result<Vec<u8>, StageFailure> {
        debug!(stage = %self.name, program = %self.program, bytes = input.len(), "Executing stage");

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StageFailure::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        // Feed stdin from a separate task so a child that writes before it
        // finishes reading cannot deadlock on a full stdout pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| StageFailure::Io("stdin was not captured".to_string()))?;
        let payload = input.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        });

        // Dropping the child on timeout kills it.
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| StageFailure::Timeout(self.timeout))?
            .map_err(|e| StageFailure::Io(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(match output.status.code() {
                Some(code) => StageFailure::Exit { code, stderr },
                None => StageFailure::Signal { stderr },
            });
        }

        match writer.await {
            Ok(Ok(())) => {}
            // The child is allowed to stop reading once it has what it needs.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(StageFailure::Io(e.to_string())),
            Err(e) => return Err(StageFailure::Io(e.to_string())),
        }

        if !stderr.is_empty() {
            debug!(stage = %self.name, %stderr, "Stage wrote to stderr");
        }
        debug!(stage = %self.name, bytes = output.stdout.len(), "Stage completed");

        Ok(output.stdout)
    }

    async fn probe(&self) -> Result<()> {
        let mut child = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start '{}' for stage '{}'", self.program, self.name))?;

        // Spawning is the check; the child has nothing to do.
        if let Err(e) = child.kill().await {
            debug!(stage = %self.name, error = %e, "Spawned child already exited");
        }
        Ok(())
    }
}
