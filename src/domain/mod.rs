//! Domain types for the render cache.
//!
//! - ArtifactId: random identifier addressing a stored artifact
//! - Artifact: rendered image bytes

pub mod artifact;
pub mod ids;

// Re-export commonly used types
pub use artifact::{Artifact, ARTIFACT_CONTENT_TYPE};
pub use ids::{ArtifactId, InvalidArtifactId, ARTIFACT_ID_BYTES, ARTIFACT_ID_LEN};
