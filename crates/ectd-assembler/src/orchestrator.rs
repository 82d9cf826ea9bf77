//! # Assembly Orchestrator
//!
//! [`SequenceAssembler`] drives one plan through the pipeline phases and
//! publishes the result. The ordering rules are strict:
//!
//! - the validation gate runs before any filesystem side effect;
//! - all staging happens under `<root>/.staging/`, discarded when assembly
//!   aborts before commit; a partially committed run keeps its staged tree
//!   so publication can be retried from the placed files;
//! - the sequence number is released whenever assembly aborts before commit;
//! - publication is a single `fs::rename`, so the submission root either
//!   shows the complete sequence directory or nothing.
//!
//! Every phase change lands in the receipt's transition log with a UTC
//! timestamp, giving each assembly an audit trail.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ectd_core::{ContentDigest, ModulePath, Region, SequenceId, Timestamp};
use ectd_manifest::{extension_for_region, BackboneManifest, ManifestEntry};
use ectd_region::{find_missing, SharedRegionTable};

use crate::error::AssemblyError;
use crate::placement::{place, SequenceDocument};
use crate::plan::SubmissionPlan;
use crate::resolver::DocumentResolver;
use crate::store::SequenceStore;

/// Pipeline phase of one assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    /// Plan received, nothing allocated.
    Planned,
    /// Sequence number reserved.
    Numbered,
    /// Validation gate passed.
    Validated,
    /// Documents placed in the scratch tree.
    Placed,
    /// Backbone and regional extension written.
    Manifested,
    /// Records persisted and tree published.
    Committed,
    /// Terminal failure state; nothing persisted, nothing published.
    Aborted,
}

impl Phase {
    /// Canonical phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Numbered => "NUMBERED",
            Self::Validated => "VALIDATED",
            Self::Placed => "PLACED",
            Self::Manifested => "MANIFESTED",
            Self::Committed => "COMMITTED",
            Self::Aborted => "ABORTED",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Phase before the change.
    pub from: Phase,
    /// Phase after the change.
    pub to: Phase,
    /// When the change occurred (UTC).
    pub at: Timestamp,
    /// Context for the change (reserved number, published path, abort cause).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// Receipt for a successfully published sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyReceipt {
    /// The published sequence number.
    pub sequence_id: SequenceId,
    /// Receiving agency.
    pub region: Region,
    /// Absolute path of the published sequence directory.
    pub published_path: PathBuf,
    /// Digest of the backbone manifest bytes on disk.
    pub manifest_digest: ContentDigest,
    /// The sequence's documents, in plan order.
    pub documents: Vec<SequenceDocument>,
    /// Full phase history of the run.
    pub transitions: Vec<PhaseTransition>,
}

/// Tunable strictness of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyPolicy {
    /// Reject `replace` slots whose module no earlier sequence populated.
    pub enforce_replace_precedent: bool,
    /// Publish attempts before a commit is reported as partial.
    pub publish_retries: u32,
}

impl Default for AssemblyPolicy {
    fn default() -> Self {
        Self {
            enforce_replace_precedent: true,
            publish_retries: 3,
        }
    }
}

/// Phase tracker for one run.
struct PhaseLog {
    current: Phase,
    transitions: Vec<PhaseTransition>,
}

impl PhaseLog {
    fn new() -> Self {
        Self {
            current: Phase::Planned,
            transitions: Vec::new(),
        }
    }

    fn advance(&mut self, to: Phase, note: Option<String>) {
        self.transitions.push(PhaseTransition {
            from: self.current,
            to,
            at: Timestamp::now(),
            note,
        });
        self.current = to;
    }
}

/// The assembly pipeline for one submission lineage.
pub struct SequenceAssembler {
    root: PathBuf,
    store: Arc<dyn SequenceStore>,
    resolver: Arc<dyn DocumentResolver>,
    regions: SharedRegionTable,
    policy: AssemblyPolicy,
}

impl SequenceAssembler {
    /// Build an assembler publishing into `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        store: Arc<dyn SequenceStore>,
        resolver: Arc<dyn DocumentResolver>,
        regions: SharedRegionTable,
    ) -> Self {
        Self {
            root: root.into(),
            store,
            resolver,
            regions,
            policy: AssemblyPolicy::default(),
        }
    }

    /// Override the default policy.
    pub fn with_policy(mut self, policy: AssemblyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The submission root this assembler publishes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read access to the region rule table handle.
    pub fn regions(&self) -> &SharedRegionTable {
        &self.regions
    }

    /// Assemble and publish one sequence from `plan`.
    pub fn assemble(&self, plan: &SubmissionPlan) -> Result<AssemblyReceipt, AssemblyError> {
        let mut log = PhaseLog::new();

        let base = SequenceId::parse(&plan.base_sequence)?;
        let sequence = self.store.reserve_next(&base)?;
        log.advance(Phase::Numbered, Some(format!("reserved {sequence}")));

        match self.assemble_reserved(plan, sequence, &mut log) {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                // Commit consumed the reservation; everything earlier must
                // hand the number back.
                if !matches!(err, AssemblyError::PartiallyCommitted { .. }) {
                    self.store.release(&sequence);
                }
                log.advance(Phase::Aborted, Some(err.to_string()));
                tracing::warn!(sequence = %sequence, error = %err, "assembly aborted");
                Err(err)
            }
        }
    }

    fn assemble_reserved(
        &self,
        plan: &SubmissionPlan,
        sequence: SequenceId,
        log: &mut PhaseLog,
    ) -> Result<AssemblyReceipt, AssemblyError> {
        // Validation gate: nothing below runs until the plan is clean.
        let profile = self
            .regions
            .read()
            .profile(plan.region)
            .cloned()
            .ok_or(AssemblyError::RegionNotConfigured(plan.region))?;

        let missing = find_missing(&plan.slots, &profile);
        if !missing.is_empty() {
            return Err(AssemblyError::MissingRequiredModules(missing));
        }

        plan.validate_structure(&profile)?;

        if self.policy.enforce_replace_precedent {
            let unprecedented: Vec<ModulePath> = plan
                .replace_modules()
                .into_iter()
                .filter(|module| !self.store.module_has_precedent(module))
                .cloned()
                .collect();
            if !unprecedented.is_empty() {
                return Err(AssemblyError::ReplaceWithoutPrecedent(unprecedented));
            }
        }

        let extension = extension_for_region(plan.region, plan.eu_regional.clone());
        if plan.region == Region::Ema && extension.is_none() {
            return Err(AssemblyError::MissingRegionalMetadata(plan.region));
        }
        log.advance(Phase::Validated, None);

        // All filesystem work goes into a scratch directory until publish.
        let scratch = self
            .root
            .join(".staging")
            .join(format!("{sequence}-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&scratch).map_err(|e| AssemblyError::staging(&scratch, e))?;

        let staged = StagedTree { path: &scratch };
        let result = self.build_and_publish(plan, sequence, &scratch, extension, log);
        if let Err(err) = &result {
            // A partial commit keeps the staged tree: the store records are
            // already durable, and retrying publication needs the placed
            // files. Every other failure discards the scratch.
            if matches!(err, AssemblyError::PartiallyCommitted { .. }) {
                tracing::warn!(
                    sequence = %sequence,
                    staging = %scratch.display(),
                    "staged tree retained for publish retry"
                );
            } else {
                staged.discard();
            }
        }
        result
    }

    fn build_and_publish(
        &self,
        plan: &SubmissionPlan,
        sequence: SequenceId,
        scratch: &Path,
        extension: Option<ectd_manifest::ExtensionSlot>,
        log: &mut PhaseLog,
    ) -> Result<AssemblyReceipt, AssemblyError> {
        let documents = place(scratch, &plan.slots, self.resolver.as_ref())?;
        log.advance(Phase::Placed, Some(format!("{} documents", documents.len())));

        let entries: Vec<ManifestEntry> = documents
            .iter()
            .map(|doc| ManifestEntry {
                document_id: doc.document_id.clone(),
                title: doc.title.clone(),
                module: doc.module.clone(),
                operation: doc.operation,
                file_path: doc.file_path.clone(),
                checksum: doc.checksum.as_ref().map(|c| c.to_string()),
            })
            .collect();
        let manifest = BackboneManifest::new(sequence, plan.region, Timestamp::now(), entries);
        let (_, manifest_digest) = manifest.write(scratch)?;
        if let Some(slot) = &extension {
            slot.write(scratch, sequence)?;
        }
        log.advance(Phase::Manifested, None);

        let target = self.root.join(sequence.dir_name());
        if target.exists() {
            return Err(AssemblyError::SequenceNumberConflict(sequence));
        }

        // Point of no return: records first, then the tree. A publish
        // failure after this line is partial, not silent.
        self.store
            .commit(sequence, plan.region, documents.clone())?;
        self.publish(scratch, &target, sequence)?;
        log.advance(
            Phase::Committed,
            Some(format!("published {}", target.display())),
        );

        tracing::info!(
            sequence = %sequence,
            region = %plan.region,
            documents = documents.len(),
            path = %target.display(),
            "sequence published"
        );

        Ok(AssemblyReceipt {
            sequence_id: sequence,
            region: plan.region,
            published_path: target,
            manifest_digest,
            documents,
            transitions: std::mem::take(&mut log.transitions),
        })
    }

    /// Atomically rename the staged tree into place, retrying per policy.
    fn publish(
        &self,
        scratch: &Path,
        target: &Path,
        sequence: SequenceId,
    ) -> Result<(), AssemblyError> {
        let attempts = self.policy.publish_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match std::fs::rename(scratch, target) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(
                        sequence = %sequence,
                        attempt,
                        error = %err,
                        "publish rename failed"
                    );
                    last_error = Some(err);
                }
            }
        }
        Err(AssemblyError::PartiallyCommitted {
            sequence,
            reason: match last_error {
                Some(err) => format!(
                    "rename to {} failed: {err}; staged tree retained at {}",
                    target.display(),
                    scratch.display()
                ),
                None => format!(
                    "rename to {} failed; staged tree retained at {}",
                    target.display(),
                    scratch.display()
                ),
            },
        })
    }

    /// Audit a committed sequence against the current region rules.
    pub fn missing_required(
        &self,
        sequence_id: &SequenceId,
    ) -> Result<(Region, Vec<ModulePath>), AssemblyError> {
        let committed = self
            .store
            .sequence(sequence_id)
            .ok_or(AssemblyError::SequenceNotFound(*sequence_id))?;
        let profile = self
            .regions
            .read()
            .profile(committed.region)
            .cloned()
            .ok_or(AssemblyError::RegionNotConfigured(committed.region))?;
        Ok((
            committed.region,
            find_missing(&committed.documents, &profile),
        ))
    }

    /// Run the required-document checker over an unassembled plan.
    ///
    /// No reservation, no side effects; the same checker the pipeline uses.
    pub fn preview_missing(
        &self,
        plan: &SubmissionPlan,
    ) -> Result<Vec<ModulePath>, AssemblyError> {
        let profile = self
            .regions
            .read()
            .profile(plan.region)
            .cloned()
            .ok_or(AssemblyError::RegionNotConfigured(plan.region))?;
        Ok(find_missing(&plan.slots, &profile))
    }
}

/// Scratch-tree guard: discards the staged directory when assembly aborts
/// before commit.
struct StagedTree<'a> {
    path: &'a Path,
}

impl StagedTree<'_> {
    fn discard(&self) {
        if let Err(err) = std::fs::remove_dir_all(self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to discard staging directory"
                );
            }
        }
    }
}
