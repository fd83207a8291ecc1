//! Core render-and-store logic.
//!
//! This module contains:
//! - ArtifactStore: Concurrency-safe in-memory artifact map
//! - IdGenerator: Identifier sources (random, sequential)
//! - RenderPipeline: Ordered stage runner that feeds the store

pub mod id_generator;
pub mod pipeline;
pub mod store;

// Re-export commonly used types
pub use id_generator::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use pipeline::{RenderError, RenderPipeline};
pub use store::{ArtifactStore, StoreError, MAX_ID_ATTEMPTS};
