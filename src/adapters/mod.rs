//! Stage interfaces for the external rendering tools.
//!
//! A stage consumes bytes and produces bytes. The production implementation
//! spawns a subprocess; tests substitute in-process fakes.

pub mod process;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

// Re-export the subprocess stage
pub use process::CommandStage;

/// Name of the stage that turns `go mod graph` output into DOT
pub const NORMALIZE_STAGE: &str = "normalize";

/// Name of the stage that lays out DOT and emits SVG
pub const RENDER_STAGE: &str = "render";

/// Why a stage produced no output
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("exited with code {code}: {stderr}")]
    Exit { code: i32, stderr: String },

    #[error("killed by signal: {stderr}")]
    Signal { stderr: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("pipe error: {0}")]
    Io(String),
}

/// One transformation step of the render pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name used in errors and logs
    fn name(&self) -> &str;

    /// Transform input bytes into output bytes
    async fn run(&self, input: &[u8]) -> Result<Vec<u8>, StageFailure>;

    /// Check that the stage can run at all
    async fn probe(&self) -> Result<()>;
}
