//! Render pipeline.
//!
//! Runs the graph description through an ordered list of stages and stores
//! the final output. Each stage's stdout is the next stage's stdin; nothing
//! reaches the store unless every stage succeeds.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::adapters::{CommandStage, Stage, NORMALIZE_STAGE, RENDER_STAGE};
use crate::config::RenderSettings;
use crate::domain::ArtifactId;

use super::store::ArtifactStore;

/// Render failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No graph description was supplied
    #[error("no graph contents")]
    EmptyInput,

    /// An external stage failed; `diagnostics` is for logs, not for callers
    #[error("{stage} stage failed")]
    Stage { stage: String, diagnostics: String },
}

impl RenderError {
    /// Name of the failed stage, if any
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::EmptyInput => None,
            Self::Stage { stage, .. } => Some(stage),
        }
    }
}

/// Stateless two-stage renderer feeding a shared store
pub struct RenderPipeline {
    stages: Vec<Arc<dyn Stage>>,
    store: Arc<ArtifactStore>,
}

impl RenderPipeline {
    /// Create a pipeline from an ordered list of stages
    pub fn new(stages: Vec<Arc<dyn Stage>>, store: Arc<ArtifactStore>) -> Self {
        Self { stages, store }
    }

    /// Build the normalize and render subprocess stages from settings
    pub fn from_settings(settings: &RenderSettings, store: Arc<ArtifactStore>) -> Self {
        let timeout = settings.stage_timeout();
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(CommandStage::from_command(
                NORMALIZE_STAGE,
                &settings.normalize,
                timeout,
            )),
            Arc::new(CommandStage::from_command(
                RENDER_STAGE,
                &settings.render,
                timeout,
            )),
        ];
        Self::new(stages, store)
    }

    /// The configured stages, in execution order
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    /// The store receiving rendered artifacts
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Render the input and store the result under a fresh identifier
    #[instrument(skip(self, input), fields(input_bytes = input.len()))]
    pub async fn render(&self, input: &[u8]) -> Result<ArtifactId, RenderError> {
        let output = self.transform(input).await?;
        let size = output.len();
        let id = self.store.put(output);
        info!(%id, size, "Stored rendered graph");
        Ok(id)
    }

    /// Run every stage in order without storing the result
    pub async fn transform(&self, input: &[u8]) -> Result<Bytes, RenderError> {
        if input.is_empty() {
            return Err(RenderError::EmptyInput);
        }

        let mut current = input.to_vec();
        for stage in &self.stages {
            let started = Instant::now();
            info!(stage = stage.name(), bytes = current.len(), "Executing stage");

            current = stage.run(&current).await.map_err(|failure| {
                let diagnostics = failure.to_string();
                error!(stage = stage.name(), %diagnostics, "Stage failed");
                RenderError::Stage {
                    stage: stage.name().to_string(),
                    diagnostics,
                }
            })?;

            debug!(
                stage = stage.name(),
                bytes = current.len(),
                elapsed = ?started.elapsed(),
                "Stage completed"
            );
        }

        Ok(Bytes::from(current))
    }
}
