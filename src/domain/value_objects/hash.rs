//! Content Hash Value Object
//!
//! SHA-256 digest of an artifact's bytes, reported alongside generated
//! declaration files so consumers can tell revisions apart.

use std::fmt;

use sha2::{Digest, Sha256};

/// Content hash value object, always carrying the `sha256:` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Compute the SHA-256 of `content`
    pub fn from_content(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self(format!("{}{:x}", Self::PREFIX, digest))
    }

    /// Full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Just the hex digest
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        let hex = self.hex();
        &hex[..hex.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
