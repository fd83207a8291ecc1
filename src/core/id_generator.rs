//! Identifier generation.
//!
//! The store asks an `IdGenerator` for every new identifier. Production uses
//! the operating system's CSPRNG; tests can swap in a deterministic source.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::error;

use crate::domain::{ArtifactId, ARTIFACT_ID_BYTES};

/// Source of fresh artifact identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier
    fn generate(&self) -> ArtifactId;
}

/// Identifiers drawn from the operating system's random source
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> ArtifactId {
        let mut bytes = [0u8; ARTIFACT_ID_BYTES];
        if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
            // Serving predictable or repeated identifiers is worse than exiting.
            error!(error = %e, "Random source failed, aborting");
            std::process::abort();
        }
        ArtifactId::from_bytes(bytes)
    }
}

/// Deterministic counter-based identifiers (0, 1, 2, ... as 128-bit hex)
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start counting from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `start`
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> ArtifactId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ArtifactId::from_bytes(u128::from(n).to_be_bytes())
    }
}
