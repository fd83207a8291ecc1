//! Rendered artifacts held by the store.
//!
//! The payload is opaque to the service; every artifact is served with the
//! same content type.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Content type of every stored artifact
pub const ARTIFACT_CONTENT_TYPE: &str = "image/svg+xml";

/// An immutable rendered image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Rendered bytes
    bytes: Bytes,

    /// When the artifact was stored
    created_at: DateTime<Utc>,
}

impl Artifact {
    /// Create a new artifact stamped with the current time
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            created_at: Utc::now(),
        }
    }

    /// The rendered bytes (cheap to clone)
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Creation time formatted for an HTTP `Last-Modified` header
    pub fn last_modified(&self) -> String {
        self.created_at
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()
    }
}
