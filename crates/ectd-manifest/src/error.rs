//! Manifest error taxonomy.

use thiserror::Error;

/// Errors raised while writing or parsing manifest files.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Canonical serialization of the manifest failed.
    #[error("manifest canonicalization failed: {0}")]
    Canonicalization(#[from] ectd_core::CanonicalizationError),

    /// The bytes did not parse as a backbone manifest.
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// A manifest file could not be read or written.
    #[error("manifest io failure at {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
