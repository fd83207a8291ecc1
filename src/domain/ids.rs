//! Artifact identifiers.
//!
//! An identifier is 128 random bits rendered as 32 lowercase hex characters.
//! It is never derived from the artifact content.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of random bytes behind an identifier
pub const ARTIFACT_ID_BYTES: usize = 16;

/// Length of the hex-encoded identifier
pub const ARTIFACT_ID_LEN: usize = ARTIFACT_ID_BYTES * 2;

/// Identifier addressing one stored artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Build an identifier from raw random bytes
    pub fn from_bytes(bytes: [u8; ARTIFACT_ID_BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse an identifier, accepting only the canonical lowercase form
    pub fn parse(s: &str) -> Result<Self, InvalidArtifactId> {
        if s.len() != ARTIFACT_ID_LEN {
            return Err(InvalidArtifactId::Length {
                actual: s.len(),
                expected: ARTIFACT_ID_LEN,
            });
        }

        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(InvalidArtifactId::Charset(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = InvalidArtifactId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Reasons a string is not a valid identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArtifactId {
    #[error("identifier must be {expected} characters, got {actual}")]
    Length { actual: usize, expected: usize },

    #[error("identifier must be lowercase hex: {0}")]
    Charset(String),
}
