//! modgraphweb - render `go mod graph` output to SVG and serve it
//!
//! Accepts a module graph over HTTP, pipes it through `modgraphviz` and
//! `dot -Tsvg`, keeps the SVG in memory under a random identifier, and
//! serves it back from `/view/<id>` with a long cache lifetime.
//!
//! # Architecture
//!
//! - Rendering is a sequence of external stages; a stage's stdout is the
//!   next stage's stdin
//! - Only complete output is stored, never partial results
//! - The store is a single mutex-guarded map shared by every request
//!
//! # Modules
//!
//! - `adapters`: Stage trait and the subprocess implementation
//! - `core`: ArtifactStore, IdGenerator, RenderPipeline
//! - `domain`: ArtifactId and Artifact
//! - `server`: HTTP routes and handlers
//! - `config`: Settings file and listening address
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Serve on $PORT (default 8080)
//! modgraphweb serve
//!
//! # Submit a graph
//! go mod graph | curl --data-binary '@-' http://localhost:8080/raw
//!
//! # Render locally without the server
//! go mod graph | modgraphweb render > graph.svg
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;

// Re-export main types at crate root for convenience
pub use adapters::{CommandStage, Stage, StageFailure};
pub use config::RenderSettings;
pub use crate::core::{ArtifactStore, IdGenerator, RenderError, RenderPipeline, StoreError};
pub use domain::{Artifact, ArtifactId};
pub use server::AppState;
