//! Assembly error taxonomy.
//!
//! Every failure mode of the pipeline is a distinct variant carrying the
//! data a caller needs to act on it: the full list of missing modules, the
//! unresolvable document id, the conflicting sequence number. The API layer
//! maps these onto status codes and machine-readable error codes.

use thiserror::Error;

use ectd_core::{DocumentId, ModulePath, Region, SequenceId, SequenceIdError};
use ectd_manifest::ManifestError;

use crate::resolver::ResolveError;

/// Errors raised while assembling a sequence.
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// The plan leaves required modules uncovered. Carries the complete
    /// list, in profile order, so one failure reports every gap at once.
    #[error("plan is missing required modules: {}", format_modules(.0))]
    MissingRequiredModules(Vec<ModulePath>),

    /// A singleton module received more than one content-bearing slot.
    #[error("duplicate slots for singleton modules: {}", format_modules(.0))]
    DuplicateSingletonModule(Vec<ModulePath>),

    /// Two `new` slots target the same module outside a multi-document
    /// subtree.
    #[error("duplicate new-document slots for module {module}")]
    DuplicateSlot {
        /// The module targeted twice.
        module: ModulePath,
    },

    /// A `replace` slot targets a module no earlier sequence ever populated.
    #[error("replace without precedent in modules: {}", format_modules(.0))]
    ReplaceWithoutPrecedent(Vec<ModulePath>),

    /// The region requires envelope metadata the plan did not supply.
    #[error("region {0} requires regional envelope metadata")]
    MissingRegionalMetadata(Region),

    /// The rule table has no profile for the plan's region.
    #[error("no rule profile configured for region {0}")]
    RegionNotConfigured(Region),

    /// The base sequence failed to parse, or the lineage is exhausted.
    #[error(transparent)]
    Sequence(#[from] SequenceIdError),

    /// The sequence number is already taken, in the store or on disk.
    #[error("sequence {0} already exists")]
    SequenceNumberConflict(SequenceId),

    /// A plan slot references a document the repository cannot resolve.
    #[error("document {0} not found in repository")]
    DocumentNotFound(DocumentId),

    /// Filesystem failure while staging or publishing.
    #[error("staging io failure at {path}: {source}")]
    Staging {
        /// The path involved.
        path: String,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },

    /// Manifest writing failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The sequence committed to the store but the tree failed to publish
    /// after exhausting retries. Requires operator intervention; never
    /// reported as success.
    #[error("sequence {sequence} committed but not published: {reason}")]
    PartiallyCommitted {
        /// The committed sequence.
        sequence: SequenceId,
        /// Why publication failed.
        reason: String,
    },

    /// A committed sequence the caller asked about does not exist.
    #[error("sequence {0} not found")]
    SequenceNotFound(SequenceId),
}

impl From<ResolveError> for AssemblyError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(id) => Self::DocumentNotFound(id),
        }
    }
}

impl AssemblyError {
    pub(crate) fn staging(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.display().to_string(),
            source,
        }
    }
}

fn format_modules(modules: &[ModulePath]) -> String {
    modules
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
