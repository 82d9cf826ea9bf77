//! # Backbone Manifest
//!
//! The backbone (`index.json`) lists every document operation in a sequence:
//! which module it targets, what it does there, and where the file landed
//! relative to the sequence root. Checksums let a gateway verify the tree
//! against the index without trusting transport integrity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ectd_core::{
    sha256_digest, CanonicalBytes, ContentDigest, DocumentId, ModulePath, Operation, Region,
    SequenceId, Timestamp,
};

use crate::error::ManifestError;

/// File name of the backbone index at the sequence root.
pub const BACKBONE_FILE_NAME: &str = "index.json";

/// One document operation recorded in the backbone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Repository identifier of the document.
    pub document_id: DocumentId,
    /// Human-readable title.
    pub title: String,
    /// Target CTD module.
    pub module: ModulePath,
    /// What this entry does to the module's content.
    pub operation: Operation,
    /// Path of the placed file relative to the sequence root. Absent for
    /// delete operations, which carry no file.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_path: Option<String>,
    /// SHA-256 checksum of the placed file, as `sha256:<hex>`. Absent
    /// exactly when `file_path` is absent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub checksum: Option<String>,
}

/// The backbone index of one sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackboneManifest {
    /// The sequence this index describes.
    pub sequence_id: SequenceId,
    /// Receiving agency.
    pub region: Region,
    /// When the manifest was assembled (UTC).
    pub created_at: Timestamp,
    /// Entries in plan order.
    pub entries: Vec<ManifestEntry>,
}

impl BackboneManifest {
    /// Assemble a manifest for a sequence.
    pub fn new(
        sequence_id: SequenceId,
        region: Region,
        created_at: Timestamp,
        entries: Vec<ManifestEntry>,
    ) -> Self {
        Self {
            sequence_id,
            region,
            created_at,
            entries,
        }
    }

    /// Canonical bytes of this manifest.
    pub fn to_canonical_bytes(&self) -> Result<CanonicalBytes, ManifestError> {
        Ok(CanonicalBytes::new(self)?)
    }

    /// Digest of the canonical manifest bytes.
    pub fn digest(&self) -> Result<ContentDigest, ManifestError> {
        Ok(sha256_digest(&self.to_canonical_bytes()?))
    }

    /// Parse a manifest back from its file bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write `index.json` into `dir`, returning the written path and the
    /// digest of the bytes on disk.
    pub fn write(&self, dir: &Path) -> Result<(PathBuf, ContentDigest), ManifestError> {
        let canonical = self.to_canonical_bytes()?;
        let path = dir.join(BACKBONE_FILE_NAME);
        std::fs::write(&path, canonical.as_bytes()).map_err(|e| ManifestError::io(&path, e))?;
        tracing::debug!(
            path = %path.display(),
            entries = self.entries.len(),
            "backbone manifest written"
        );
        Ok((path, sha256_digest(&canonical)))
    }

    /// The `(module, operation, document_id)` triples, in entry order.
    ///
    /// This is the round-trip identity: parsing a written manifest yields
    /// exactly these triples back.
    pub fn triples(&self) -> Vec<(&ModulePath, Operation, &DocumentId)> {
        self.entries
            .iter()
            .map(|e| (&e.module, e.operation, &e.document_id))
            .collect()
    }
}
