//! The binary produced by a successful build

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{hash::compute_sha256, Result};

/// Final artifact path and its SHA-256 fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryArtifactInfo {
    /// Path to the release binary
    pub path: String,
    /// Lowercase hex SHA-256 of the binary
    pub fingerprint: String,
}

impl BinaryArtifactInfo {
    pub fn new(path: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self { path: path.into(), fingerprint: fingerprint.into() }
    }

    /// Binary file name, which is also the installed command name
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name()?.to_str()
    }

    /// Re-hash the file on disk and compare against the recorded fingerprint
    pub fn verify(&self) -> Result<bool> {
        let actual = compute_sha256(Path::new(&self.path))?;
        Ok(actual.eq_ignore_ascii_case(&self.fingerprint))
    }

    /// JSON form handed to the publishing step
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
