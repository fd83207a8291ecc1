//! Test doubles shared by the integration suites.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use modgraphweb::adapters::{Stage, StageFailure, NORMALIZE_STAGE, RENDER_STAGE};
use modgraphweb::core::{ArtifactStore, RenderPipeline};

/// SVG produced by the fake render stage
pub const FAKE_SVG: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n<svg></svg>\n";

/// In-process stage with a canned outcome
pub struct FakeStage {
    name: &'static str,
    outcome: Outcome,
    calls: AtomicUsize,
}

enum Outcome {
    /// Wrap the input: `<prefix><input><suffix>`
    Wrap(&'static str, &'static str),
    Fixed(&'static [u8]),
    Fail(&'static str),
}

impl FakeStage {
    /// Normalize stage that turns input into a DOT graph
    pub fn normalize() -> Arc<Self> {
        Self::new(NORMALIZE_STAGE, Outcome::Wrap("digraph gomodgraph {\n", "}\n"))
    }

    /// Render stage that always emits `FAKE_SVG`
    pub fn render() -> Arc<Self> {
        Self::new(RENDER_STAGE, Outcome::Fixed(FAKE_SVG))
    }

    /// Stage that exits non-zero with the given stderr
    pub fn failing(name: &'static str, stderr: &'static str) -> Arc<Self> {
        Self::new(name, Outcome::Fail(stderr))
    }

    fn new(name: &'static str, outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Stage for FakeStage {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, input: &[u8]) -> Result<Vec<u8>, StageFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Wrap(prefix, suffix) => {
                let mut out = prefix.as_bytes().to_vec();
                out.extend_from_slice(input);
                out.extend_from_slice(suffix.as_bytes());
                Ok(out)
            }
            Outcome::Fixed(bytes) => Ok(bytes.to_vec()),
            Outcome::Fail(stderr) => Err(StageFailure::Exit {
                code: 1,
                stderr: stderr.to_string(),
            }),
        }
    }

    async fn probe(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Pipeline over the given stages with a fresh store
pub fn pipeline_with(stages: &[Arc<FakeStage>]) -> RenderPipeline {
    let stages: Vec<Arc<dyn Stage>> = stages
        .iter()
        .map(|s| Arc::clone(s) as Arc<dyn Stage>)
        .collect();
    RenderPipeline::new(stages, Arc::new(ArtifactStore::new()))
}
