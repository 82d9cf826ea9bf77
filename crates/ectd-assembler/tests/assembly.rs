//! End-to-end assembly scenarios against a real temp filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use ectd_assembler::{
    AssemblyError, AssemblyPolicy, CommittedSequence, DocSlot, DocumentResolver,
    InMemoryDocumentStore, InMemorySequenceStore, Phase, ResolveError, SequenceAssembler,
    SequenceDocument, SequenceStore, SubmissionPlan,
};
use ectd_core::{Document, DocumentId, ModulePath, Operation, Region, SequenceId};
use ectd_manifest::{BackboneManifest, EuRegionalMetadata, BACKBONE_FILE_NAME, EU_REGIONAL_FILE_NAME};
use ectd_region::SharedRegionTable;

struct Fixture {
    _source: TempDir,
    root: TempDir,
    resolver: Arc<InMemoryDocumentStore>,
    store: Arc<InMemorySequenceStore>,
}

impl Fixture {
    fn new(doc_ids: &[&str]) -> Self {
        let source = TempDir::new().unwrap();
        let resolver = Arc::new(InMemoryDocumentStore::new());
        for id in doc_ids {
            let path = source.path().join(format!("{id}.pdf"));
            std::fs::write(&path, format!("content of {id}")).unwrap();
            resolver.insert(Document {
                id: DocumentId::new(*id),
                title: format!("Document {id}"),
                version: "1.0".to_string(),
                slug: Some(id.to_string()),
                storage_path: path,
            });
        }
        Self {
            _source: source,
            root: TempDir::new().unwrap(),
            resolver,
            store: Arc::new(InMemorySequenceStore::new()),
        }
    }

    fn assembler(&self) -> SequenceAssembler {
        SequenceAssembler::new(
            self.root.path(),
            Arc::clone(&self.store) as Arc<dyn SequenceStore>,
            Arc::clone(&self.resolver) as Arc<dyn DocumentResolver>,
            SharedRegionTable::default(),
        )
    }
}

fn slot(id: &str, module: &str, operation: Operation) -> DocSlot {
    DocSlot {
        document_id: DocumentId::new(id),
        title: format!("Document {id}"),
        version: "1.0".to_string(),
        module: ModulePath::parse(module).unwrap(),
        operation,
    }
}

fn eu_metadata() -> EuRegionalMetadata {
    EuRegionalMetadata {
        procedure_type: "centralised".to_string(),
        applicant_name: "Acme Pharma B.V.".to_string(),
        agency_code: None,
    }
}

/// A complete EMA plan over base 0003.
fn ema_plan(doc_ids: [&str; 4]) -> SubmissionPlan {
    SubmissionPlan {
        base_sequence: "0003".to_string(),
        region: Region::Ema,
        slots: vec![
            slot(doc_ids[0], "m1.0", Operation::New),
            slot(doc_ids[1], "m1.2", Operation::New),
            slot(doc_ids[2], "m1.3", Operation::New),
            slot(doc_ids[3], "m1.5", Operation::New),
        ],
        eu_regional: Some(eu_metadata()),
    }
}

fn staging_is_empty(root: &Path) -> bool {
    let staging = root.join(".staging");
    !staging.exists() || std::fs::read_dir(&staging).unwrap().count() == 0
}

#[test]
fn ema_sequence_assembles_end_to_end() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let receipt = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();

    assert_eq!(receipt.sequence_id, SequenceId::parse("0004").unwrap());
    assert_eq!(receipt.region, Region::Ema);
    assert_eq!(receipt.published_path, fixture.root.path().join("0004"));

    // Tree layout and content.
    let published = &receipt.published_path;
    assert_eq!(
        std::fs::read(published.join("m1/0/cover.pdf")).unwrap(),
        b"content of cover"
    );
    assert!(published.join("m1/2/form.pdf").exists());
    assert!(published.join("m1/3/pi.pdf").exists());
    assert!(published.join("m1/5/responses.pdf").exists());

    // Backbone parses back to the same triples, digest matches disk bytes.
    let bytes = std::fs::read(published.join(BACKBONE_FILE_NAME)).unwrap();
    let manifest = BackboneManifest::from_json_bytes(&bytes).unwrap();
    assert_eq!(manifest.entries.len(), 4);
    assert_eq!(manifest.sequence_id, receipt.sequence_id);
    assert_eq!(ectd_core::sha256_bytes(&bytes), receipt.manifest_digest);

    // EU envelope present.
    let eu: serde_json::Value =
        serde_json::from_slice(&std::fs::read(published.join(EU_REGIONAL_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(eu["sequence_id"], "0004");
    assert_eq!(eu["applicant_name"], "Acme Pharma B.V.");

    // Full phase history, ending committed, and no staging residue.
    let phases: Vec<Phase> = receipt.transitions.iter().map(|t| t.to).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Numbered,
            Phase::Validated,
            Phase::Placed,
            Phase::Manifested,
            Phase::Committed
        ]
    );
    assert!(staging_is_empty(fixture.root.path()));
}

#[test]
fn missing_required_module_aborts_with_full_list() {
    let fixture = Fixture::new(&["cover", "form"]);
    let assembler = fixture.assembler();

    let plan = SubmissionPlan {
        base_sequence: "0003".to_string(),
        region: Region::Ema,
        slots: vec![
            slot("cover", "m1.0", Operation::New),
            slot("form", "m1.2", Operation::New),
        ],
        eu_regional: Some(eu_metadata()),
    };

    match assembler.assemble(&plan).unwrap_err() {
        AssemblyError::MissingRequiredModules(missing) => {
            let names: Vec<&str> = missing.iter().map(|m| m.as_str()).collect();
            assert_eq!(names, vec!["m1.3", "m1.5"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    // No side effects at all.
    assert!(!fixture.root.path().join("0004").exists());
    assert!(staging_is_empty(fixture.root.path()));
    assert!(fixture.store.latest().is_none());
}

#[test]
fn released_reservation_is_reused_on_same_store() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let incomplete = SubmissionPlan {
        base_sequence: "0003".to_string(),
        region: Region::Ema,
        slots: vec![slot("cover", "m1.0", Operation::New)],
        eu_regional: Some(eu_metadata()),
    };
    assert!(assembler.assemble(&incomplete).is_err());

    let receipt = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();
    assert_eq!(receipt.sequence_id.to_string(), "0004");
}

#[test]
fn unresolvable_document_leaves_no_residue() {
    let fixture = Fixture::new(&["cover", "form", "pi"]);
    let assembler = fixture.assembler();

    // Slot 4 references a document the repository does not have; the first
    // three have already been staged by the time resolution fails.
    let err = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "ghost"]))
        .unwrap_err();
    assert!(matches!(err, AssemblyError::DocumentNotFound(id) if id.as_str() == "ghost"));

    assert!(!fixture.root.path().join("0004").exists());
    assert!(staging_is_empty(fixture.root.path()));
    assert!(fixture.store.latest().is_none());
}

#[test]
fn ema_without_envelope_metadata_is_rejected() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let mut plan = ema_plan(["cover", "form", "pi", "responses"]);
    plan.eu_regional = None;

    assert!(matches!(
        assembler.assemble(&plan).unwrap_err(),
        AssemblyError::MissingRegionalMetadata(Region::Ema)
    ));
}

#[test]
fn fda_sequence_has_no_regional_extension() {
    let fixture = Fixture::new(&["forms", "cover", "labeling"]);
    let assembler = fixture.assembler();

    let plan = SubmissionPlan {
        base_sequence: "0000".to_string(),
        region: Region::Fda,
        slots: vec![
            slot("forms", "m1.1", Operation::New),
            slot("cover", "m1.2", Operation::New),
            slot("labeling", "m1.3", Operation::New),
        ],
        eu_regional: None,
    };

    let receipt = assembler.assemble(&plan).unwrap();
    assert!(!receipt.published_path.join(EU_REGIONAL_FILE_NAME).exists());
    assert!(receipt.published_path.join(BACKBONE_FILE_NAME).exists());
}

#[test]
fn pmda_sequence_publishes_without_envelope() {
    let fixture = Fixture::new(&["application", "overview"]);
    let assembler = fixture.assembler();

    let plan = SubmissionPlan {
        base_sequence: "0000".to_string(),
        region: Region::Pmda,
        slots: vec![
            slot("application", "m1.1", Operation::New),
            slot("overview", "m1.2", Operation::New),
        ],
        eu_regional: None,
    };

    // The JP envelope slot is reserved; the sequence still publishes.
    let receipt = assembler.assemble(&plan).unwrap();
    assert!(receipt.published_path.join(BACKBONE_FILE_NAME).exists());
    assert_eq!(
        std::fs::read_dir(&receipt.published_path)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name() == EU_REGIONAL_FILE_NAME)
            .count(),
        0
    );
}

#[test]
fn replace_without_precedent_is_gated() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let mut plan = ema_plan(["cover", "form", "pi", "responses"]);
    plan.slots[2].operation = Operation::Replace;

    match assembler.assemble(&plan).unwrap_err() {
        AssemblyError::ReplaceWithoutPrecedent(modules) => {
            assert_eq!(modules.len(), 1);
            assert_eq!(modules[0].as_str(), "m1.3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn replace_with_precedent_succeeds() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let first = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();
    assert_eq!(first.sequence_id.to_string(), "0004");

    let mut second = ema_plan(["cover", "form", "pi", "responses"]);
    second.base_sequence = "0004".to_string();
    second.slots[2].operation = Operation::Replace;

    let receipt = assembler.assemble(&second).unwrap();
    assert_eq!(receipt.sequence_id.to_string(), "0005");
}

#[test]
fn replace_gate_can_be_disabled_by_policy() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler().with_policy(AssemblyPolicy {
        enforce_replace_precedent: false,
        ..AssemblyPolicy::default()
    });

    let mut plan = ema_plan(["cover", "form", "pi", "responses"]);
    plan.slots[2].operation = Operation::Replace;

    assert!(assembler.assemble(&plan).is_ok());
}

#[test]
fn existing_target_directory_is_a_conflict() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    // Something already sits where 0004 would publish.
    std::fs::create_dir_all(fixture.root.path().join("0004")).unwrap();

    let err = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap_err();
    assert!(matches!(
        err,
        AssemblyError::SequenceNumberConflict(s) if s.to_string() == "0004"
    ));
    // Nothing was committed and staging is clean.
    assert!(fixture.store.latest().is_none());
    assert!(staging_is_empty(fixture.root.path()));
}

/// A resolver that plants `index.json` as a directory inside the scratch
/// tree while resolving its sentinel document, so the manifest write after
/// placement fails.
struct ManifestBlockingResolver {
    inner: Arc<InMemoryDocumentStore>,
    root: PathBuf,
    sentinel: DocumentId,
}

impl DocumentResolver for ManifestBlockingResolver {
    fn resolve(&self, id: &DocumentId) -> Result<Document, ResolveError> {
        if id == &self.sentinel {
            let staging = self.root.join(".staging");
            for entry in std::fs::read_dir(&staging).unwrap().filter_map(Result::ok) {
                std::fs::create_dir_all(entry.path().join(BACKBONE_FILE_NAME)).unwrap();
            }
        }
        self.inner.resolve(id)
    }
}

#[test]
fn manifest_write_failure_after_placement_leaves_no_residue() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    // The sentinel is the last slot, so every document is placed before the
    // backbone write hits the blocker.
    let resolver = Arc::new(ManifestBlockingResolver {
        inner: Arc::clone(&fixture.resolver),
        root: fixture.root.path().to_path_buf(),
        sentinel: DocumentId::new("responses"),
    });
    let assembler = SequenceAssembler::new(
        fixture.root.path(),
        Arc::clone(&fixture.store) as Arc<dyn SequenceStore>,
        resolver as Arc<dyn DocumentResolver>,
        SharedRegionTable::default(),
    );

    let err = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap_err();
    assert!(matches!(err, AssemblyError::Manifest(_)));

    // Placement had finished; the failed manifest write rolls it all back.
    assert!(!fixture.root.path().join("0004").exists());
    assert!(staging_is_empty(fixture.root.path()));
    assert!(fixture.store.latest().is_none());

    // The number went back into the pool: a clean run takes 0004.
    let receipt = fixture
        .assembler()
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();
    assert_eq!(receipt.sequence_id.to_string(), "0004");
}

/// A store whose commit plants a blocker at the publish target, so the
/// rename after commit can never succeed.
struct PublishBlockingStore {
    inner: InMemorySequenceStore,
    root: PathBuf,
}

impl SequenceStore for PublishBlockingStore {
    fn reserve_next(&self, base: &SequenceId) -> Result<SequenceId, AssemblyError> {
        self.inner.reserve_next(base)
    }

    fn release(&self, sequence_id: &SequenceId) {
        self.inner.release(sequence_id)
    }

    fn commit(
        &self,
        sequence_id: SequenceId,
        region: Region,
        documents: Vec<SequenceDocument>,
    ) -> Result<(), AssemblyError> {
        self.inner.commit(sequence_id, region, documents)?;
        std::fs::write(self.root.join(sequence_id.dir_name()), b"blocker").unwrap();
        Ok(())
    }

    fn sequence(&self, sequence_id: &SequenceId) -> Option<CommittedSequence> {
        self.inner.sequence(sequence_id)
    }

    fn documents(&self, sequence_id: &SequenceId) -> Option<Vec<SequenceDocument>> {
        self.inner.documents(sequence_id)
    }

    fn latest(&self) -> Option<SequenceId> {
        self.inner.latest()
    }

    fn module_has_precedent(&self, module: &ModulePath) -> bool {
        self.inner.module_has_precedent(module)
    }
}

#[test]
fn partial_commit_keeps_staged_tree_for_retry() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let store = Arc::new(PublishBlockingStore {
        inner: InMemorySequenceStore::new(),
        root: fixture.root.path().to_path_buf(),
    });
    let assembler = SequenceAssembler::new(
        fixture.root.path(),
        Arc::clone(&store) as Arc<dyn SequenceStore>,
        Arc::clone(&fixture.resolver) as Arc<dyn DocumentResolver>,
        SharedRegionTable::default(),
    );

    let err = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap_err();
    match &err {
        AssemblyError::PartiallyCommitted { sequence, reason } => {
            assert_eq!(sequence.to_string(), "0004");
            // The error names the retained staging path for the operator.
            assert!(reason.contains(".staging"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The commit is durable.
    assert_eq!(store.latest().unwrap().to_string(), "0004");

    // The placed files and manifest survive for a publish retry; the
    // committed records must never point at a discarded tree.
    let staging = fixture.root.path().join(".staging");
    let entries: Vec<_> = std::fs::read_dir(&staging)
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(entries.len(), 1);
    let staged = entries[0].path();
    assert!(staged.join(BACKBONE_FILE_NAME).exists());
    assert!(staged.join(EU_REGIONAL_FILE_NAME).exists());
    assert!(staged.join("m1/0/cover.pdf").exists());
    assert!(staged.join("m1/5/responses.pdf").exists());
}

#[test]
fn stale_base_is_advanced_under_reservation() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let first = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();
    assert_eq!(first.sequence_id.to_string(), "0004");

    // Same stale base again: numbering advances instead of colliding.
    let receipt = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();
    assert_eq!(receipt.sequence_id.to_string(), "0005");
    assert!(fixture.root.path().join("0005").exists());
}

#[test]
fn invalid_base_sequence_is_rejected_up_front() {
    let fixture = Fixture::new(&[]);
    let assembler = fixture.assembler();

    let plan = SubmissionPlan {
        base_sequence: "12ab".to_string(),
        region: Region::Ema,
        slots: vec![],
        eu_regional: Some(eu_metadata()),
    };
    assert!(matches!(
        assembler.assemble(&plan).unwrap_err(),
        AssemblyError::Sequence(_)
    ));
}

#[test]
fn committed_sequence_audit_uses_current_rules() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let receipt = assembler
        .assemble(&ema_plan(["cover", "form", "pi", "responses"]))
        .unwrap();

    let (region, missing) = assembler.missing_required(&receipt.sequence_id).unwrap();
    assert_eq!(region, Region::Ema);
    assert!(missing.is_empty());

    let unknown = SequenceId::parse("0099").unwrap();
    assert!(matches!(
        assembler.missing_required(&unknown).unwrap_err(),
        AssemblyError::SequenceNotFound(_)
    ));
}

#[test]
fn preview_missing_reports_without_side_effects() {
    let fixture = Fixture::new(&[]);
    let assembler = fixture.assembler();

    let plan = SubmissionPlan {
        base_sequence: "0003".to_string(),
        region: Region::Ema,
        slots: vec![slot("cover", "m1.0", Operation::New)],
        eu_regional: None,
    };

    let missing = assembler.preview_missing(&plan).unwrap();
    let names: Vec<&str> = missing.iter().map(|m| m.as_str()).collect();
    assert_eq!(names, vec!["m1.2", "m1.3", "m1.5"]);
    assert!(staging_is_empty(fixture.root.path()));
    assert!(fixture.store.latest().is_none());
}

#[test]
fn delete_slot_appears_in_backbone_without_file() {
    let fixture = Fixture::new(&["cover", "form", "pi", "responses"]);
    let assembler = fixture.assembler();

    let mut plan = ema_plan(["cover", "form", "pi", "responses"]);
    plan.slots.push(slot("old-annex", "m1.4", Operation::Delete));

    let receipt = assembler.assemble(&plan).unwrap();
    let bytes = std::fs::read(receipt.published_path.join(BACKBONE_FILE_NAME)).unwrap();
    let manifest = BackboneManifest::from_json_bytes(&bytes).unwrap();
    let delete_entry = manifest
        .entries
        .iter()
        .find(|e| e.operation == Operation::Delete)
        .unwrap();
    assert!(delete_entry.file_path.is_none());
    assert!(delete_entry.checksum.is_none());
    assert!(!receipt.published_path.join("m1/4").exists());
}
