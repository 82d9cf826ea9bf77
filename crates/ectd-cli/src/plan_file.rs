//! # Plan Files
//!
//! The CLI's input format: a submission plan plus the documents it
//! references, in one JSON or YAML file. The `documents` section points at
//! local files standing in for the document repository.
//!
//! ```yaml
//! base_sequence: "0003"
//! region: EMA
//! slots:
//!   - document_id: cover
//!     title: Cover Letter
//!     version: "1.0"
//!     module: m1.0
//!     operation: new
//! eu_regional:
//!   procedure_type: centralised
//!   applicant_name: Acme Pharma B.V.
//! documents:
//!   - id: cover
//!     title: Cover Letter
//!     version: "1.0"
//!     path: ./docs/cover-letter.pdf
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use ectd_assembler::{DocSlot, InMemoryDocumentStore, SubmissionPlan};
use ectd_core::{Document, DocumentId, Region};
use ectd_manifest::EuRegionalMetadata;

/// A document source bundled with a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Identifier the slots reference.
    pub id: DocumentId,
    /// Title recorded in the backbone.
    pub title: String,
    /// Version string.
    pub version: String,
    /// Filesystem-safe name override.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slug: Option<String>,
    /// Local file with the document content. Relative paths resolve
    /// against the plan file's directory.
    pub path: PathBuf,
}

/// The on-disk plan file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub base_sequence: String,
    pub region: Region,
    pub slots: Vec<DocSlot>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eu_regional: Option<EuRegionalMetadata>,
    #[serde(default)]
    pub documents: Vec<DocumentSpec>,
}

impl PlanFile {
    /// Load a plan file, choosing the parser by extension
    /// (`.yaml`/`.yml` parse as YAML, everything else as JSON).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan file {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let plan: PlanFile = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML plan in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON plan in {}", path.display()))?
        };
        Ok(plan)
    }

    /// Split into the assembler's plan and a resolver over the bundled
    /// documents. `base_dir` anchors relative document paths.
    pub fn into_parts(self, base_dir: &Path) -> (SubmissionPlan, InMemoryDocumentStore) {
        let store = InMemoryDocumentStore::new();
        for spec in self.documents {
            let storage_path = if spec.path.is_absolute() {
                spec.path
            } else {
                base_dir.join(spec.path)
            };
            store.insert(Document {
                id: spec.id,
                title: spec.title,
                version: spec.version,
                slug: spec.slug,
                storage_path,
            });
        }
        let plan = SubmissionPlan {
            base_sequence: self.base_sequence,
            region: self.region,
            slots: self.slots,
            eu_regional: self.eu_regional,
        };
        (plan, store)
    }
}
