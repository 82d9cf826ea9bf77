//! # Regional Extension Envelopes
//!
//! Some agencies require an envelope file beside the backbone. EMA sequences
//! carry `eu_regional.json`; FDA requires nothing beyond the backbone; the
//! PMDA envelope is a declared extension slot that is not yet built.
//!
//! The slot is explicit on purpose: assembling a PMDA sequence logs a warning
//! at the point the envelope would be written, so the gap is visible in traces
//! instead of silently producing an incomplete package.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ectd_core::{CanonicalBytes, Region, SequenceId};

use crate::error::ManifestError;

/// File name of the EU envelope at the sequence root.
pub const EU_REGIONAL_FILE_NAME: &str = "eu_regional.json";

/// Caller-supplied EU envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EuRegionalMetadata {
    /// EU procedure type (e.g. "centralised", "decentralised").
    pub procedure_type: String,
    /// Legal name of the applicant.
    pub applicant_name: String,
    /// National agency code for non-centralised procedures.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub agency_code: Option<String>,
}

/// The regional envelope work for one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSlot {
    /// EU envelope, written as `eu_regional.json`.
    Eu(EuRegionalMetadata),
    /// PMDA envelope. Reserved: the JP builder does not exist yet, and
    /// reaching this slot logs a warning instead of writing anything.
    JpReserved,
}

/// On-disk shape of `eu_regional.json`.
#[derive(Debug, Serialize, Deserialize)]
struct EuRegionalFile {
    sequence_id: SequenceId,
    #[serde(flatten)]
    metadata: EuRegionalMetadata,
}

impl ExtensionSlot {
    /// Write this extension into `dir` for `sequence_id`.
    ///
    /// Returns the written path, or `None` when the slot produced no file.
    pub fn write(
        &self,
        dir: &Path,
        sequence_id: SequenceId,
    ) -> Result<Option<PathBuf>, ManifestError> {
        match self {
            Self::Eu(metadata) => {
                let file = EuRegionalFile {
                    sequence_id,
                    metadata: metadata.clone(),
                };
                let canonical = CanonicalBytes::new(&file)?;
                let path = dir.join(EU_REGIONAL_FILE_NAME);
                std::fs::write(&path, canonical.as_bytes())
                    .map_err(|e| ManifestError::io(&path, e))?;
                tracing::debug!(path = %path.display(), "eu regional envelope written");
                Ok(Some(path))
            }
            Self::JpReserved => {
                tracing::warn!(
                    %sequence_id,
                    "jp regional envelope builder not implemented, sequence published without envelope"
                );
                Ok(None)
            }
        }
    }
}

/// Which extension a region's sequences carry.
///
/// `eu_metadata` must be present for EMA; the caller validates that before
/// assembly reaches the writer.
pub fn extension_for_region(
    region: Region,
    eu_metadata: Option<EuRegionalMetadata>,
) -> Option<ExtensionSlot> {
    match region {
        Region::Fda => None,
        Region::Ema => eu_metadata.map(ExtensionSlot::Eu),
        Region::Pmda => Some(ExtensionSlot::JpReserved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> EuRegionalMetadata {
        EuRegionalMetadata {
            procedure_type: "centralised".to_string(),
            applicant_name: "Acme Pharma B.V.".to_string(),
            agency_code: None,
        }
    }

    #[test]
    fn test_eu_envelope_written_and_parseable() {
        let dir = tempfile::tempdir().unwrap();
        let seq = SequenceId::parse("0004").unwrap();
        let slot = ExtensionSlot::Eu(metadata());

        let path = slot.write(dir.path(), seq).unwrap().unwrap();
        assert_eq!(path, dir.path().join(EU_REGIONAL_FILE_NAME));

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["sequence_id"], "0004");
        assert_eq!(json["procedure_type"], "centralised");
        assert_eq!(json["applicant_name"], "Acme Pharma B.V.");
        assert!(json.get("agency_code").is_none());
    }

    #[test]
    fn test_jp_reserved_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let seq = SequenceId::parse("0001").unwrap();
        let written = ExtensionSlot::JpReserved.write(dir.path(), seq).unwrap();
        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_extension_per_region() {
        assert_eq!(extension_for_region(Region::Fda, Some(metadata())), None);
        assert_eq!(
            extension_for_region(Region::Ema, Some(metadata())),
            Some(ExtensionSlot::Eu(metadata()))
        );
        assert_eq!(extension_for_region(Region::Ema, None), None);
        assert_eq!(
            extension_for_region(Region::Pmda, None),
            Some(ExtensionSlot::JpReserved)
        );
    }
}
