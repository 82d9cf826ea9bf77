//! # Sequence Store
//!
//! The store is the authority on which sequence numbers exist in a lineage.
//! Reservation and commit both go through it, which is what makes numbering
//! gap-free and collision-free under concurrency: `reserve_next` hands out
//! each number exactly once under a single lock, and `commit` refuses
//! duplicates outright.
//!
//! Committed sequences are immutable. There is no update and no delete; a
//! correction is a new sequence, which is how submission lineages work.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use ectd_core::{ModulePath, Region, SequenceId, Timestamp};

use crate::allocator::next_sequence;
use crate::error::AssemblyError;
use crate::placement::SequenceDocument;

/// A committed sequence's record.
#[derive(Debug, Clone)]
pub struct CommittedSequence {
    /// The sequence number.
    pub sequence_id: SequenceId,
    /// Receiving agency.
    pub region: Region,
    /// Commit time (UTC).
    pub committed_at: Timestamp,
    /// The documents of this sequence, in plan order.
    pub documents: Vec<SequenceDocument>,
}

/// Authority over sequence numbers and committed records for one lineage.
pub trait SequenceStore: Send + Sync {
    /// Atomically reserve the number after `base`.
    ///
    /// When `base` is stale (a later sequence is already committed or
    /// reserved), the reservation advances past the latest known number
    /// instead of handing out a duplicate. Two concurrent callers always
    /// receive distinct consecutive numbers.
    fn reserve_next(&self, base: &SequenceId) -> Result<SequenceId, AssemblyError>;

    /// Release a reservation that will not be committed.
    fn release(&self, sequence_id: &SequenceId);

    /// Commit a reserved sequence with its documents.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::SequenceNumberConflict`] when the number is already
    /// committed.
    fn commit(
        &self,
        sequence_id: SequenceId,
        region: Region,
        documents: Vec<SequenceDocument>,
    ) -> Result<(), AssemblyError>;

    /// Look up a committed sequence.
    fn sequence(&self, sequence_id: &SequenceId) -> Option<CommittedSequence>;

    /// The documents of a committed sequence.
    fn documents(&self, sequence_id: &SequenceId) -> Option<Vec<SequenceDocument>>;

    /// The highest committed sequence number, if any.
    fn latest(&self) -> Option<SequenceId>;

    /// Whether any committed sequence placed content at `module` or below.
    ///
    /// Backs the replace-precedent gate: a `replace` must supersede
    /// something that exists.
    fn module_has_precedent(&self, module: &ModulePath) -> bool;
}

#[derive(Debug, Default)]
struct StoreInner {
    committed: BTreeMap<SequenceId, CommittedSequence>,
    reserved: BTreeSet<SequenceId>,
}

/// In-memory store, one instance per lineage.
#[derive(Debug, Default)]
pub struct InMemorySequenceStore {
    inner: Mutex<StoreInner>,
}

impl InMemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceStore for InMemorySequenceStore {
    fn reserve_next(&self, base: &SequenceId) -> Result<SequenceId, AssemblyError> {
        let mut inner = self.inner.lock();
        // Effective base: the caller's base or the latest number the store
        // has handed out, whichever is higher.
        let mut effective = *base;
        if let Some(latest) = inner.committed.keys().next_back() {
            effective = effective.max(*latest);
        }
        if let Some(reserved) = inner.reserved.iter().next_back() {
            effective = effective.max(*reserved);
        }
        // The allocator owns the increment; the store only picks the base.
        let (next, _) = next_sequence(&effective.dir_name())?;
        inner.reserved.insert(next);
        tracing::debug!(base = %base, reserved = %next, "sequence number reserved");
        Ok(next)
    }

    fn release(&self, sequence_id: &SequenceId) {
        let mut inner = self.inner.lock();
        if inner.reserved.remove(sequence_id) {
            tracing::debug!(sequence = %sequence_id, "sequence reservation released");
        }
    }

    fn commit(
        &self,
        sequence_id: SequenceId,
        region: Region,
        documents: Vec<SequenceDocument>,
    ) -> Result<(), AssemblyError> {
        let mut inner = self.inner.lock();
        if inner.committed.contains_key(&sequence_id) {
            return Err(AssemblyError::SequenceNumberConflict(sequence_id));
        }
        inner.reserved.remove(&sequence_id);
        inner.committed.insert(
            sequence_id,
            CommittedSequence {
                sequence_id,
                region,
                committed_at: Timestamp::now(),
                documents,
            },
        );
        Ok(())
    }

    fn sequence(&self, sequence_id: &SequenceId) -> Option<CommittedSequence> {
        self.inner.lock().committed.get(sequence_id).cloned()
    }

    fn documents(&self, sequence_id: &SequenceId) -> Option<Vec<SequenceDocument>> {
        self.inner
            .lock()
            .committed
            .get(sequence_id)
            .map(|s| s.documents.clone())
    }

    fn latest(&self) -> Option<SequenceId> {
        self.inner.lock().committed.keys().next_back().copied()
    }

    fn module_has_precedent(&self, module: &ModulePath) -> bool {
        self.inner.lock().committed.values().any(|sequence| {
            sequence.documents.iter().any(|doc| {
                doc.operation.contributes_content() && doc.module.is_within(module)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ectd_core::{DocumentId, Operation};
    use std::sync::Arc;

    fn seq(s: &str) -> SequenceId {
        SequenceId::parse(s).unwrap()
    }

    fn doc(module: &str, operation: Operation) -> SequenceDocument {
        SequenceDocument {
            document_id: DocumentId::new("doc-1"),
            title: "Doc".to_string(),
            version: "1.0".to_string(),
            module: ModulePath::parse(module).unwrap(),
            operation,
            file_path: operation
                .contributes_content()
                .then(|| format!("{}/file.pdf", module.replace('.', "/"))),
            checksum: None,
        }
    }

    #[test]
    fn test_reserve_increments_base() {
        let store = InMemorySequenceStore::new();
        assert_eq!(store.reserve_next(&seq("0003")).unwrap(), seq("0004"));
    }

    #[test]
    fn test_reserve_agrees_with_allocator() {
        let store = InMemorySequenceStore::new();
        let (expected, _) = next_sequence("0003").unwrap();
        assert_eq!(store.reserve_next(&seq("0003")).unwrap(), expected);
    }

    #[test]
    fn test_reserve_advances_past_reservations() {
        let store = InMemorySequenceStore::new();
        let a = store.reserve_next(&seq("0003")).unwrap();
        let b = store.reserve_next(&seq("0003")).unwrap();
        assert_eq!(a, seq("0004"));
        assert_eq!(b, seq("0005"));
    }

    #[test]
    fn test_stale_base_advances_past_committed() {
        let store = InMemorySequenceStore::new();
        store.commit(seq("0007"), Region::Ema, vec![]).unwrap();
        assert_eq!(store.reserve_next(&seq("0003")).unwrap(), seq("0008"));
    }

    #[test]
    fn test_release_frees_number() {
        let store = InMemorySequenceStore::new();
        let a = store.reserve_next(&seq("0003")).unwrap();
        store.release(&a);
        assert_eq!(store.reserve_next(&seq("0003")).unwrap(), a);
    }

    #[test]
    fn test_commit_rejects_duplicate() {
        let store = InMemorySequenceStore::new();
        store.commit(seq("0004"), Region::Ema, vec![]).unwrap();
        assert!(matches!(
            store.commit(seq("0004"), Region::Ema, vec![]),
            Err(AssemblyError::SequenceNumberConflict(s)) if s == seq("0004")
        ));
    }

    #[test]
    fn test_latest_tracks_highest_committed() {
        let store = InMemorySequenceStore::new();
        assert!(store.latest().is_none());
        store.commit(seq("0002"), Region::Ema, vec![]).unwrap();
        store.commit(seq("0005"), Region::Ema, vec![]).unwrap();
        assert_eq!(store.latest(), Some(seq("0005")));
    }

    #[test]
    fn test_module_precedent_from_content_only() {
        let store = InMemorySequenceStore::new();
        store
            .commit(
                seq("0001"),
                Region::Ema,
                vec![doc("m1.3.1", Operation::New), doc("m1.4", Operation::Delete)],
            )
            .unwrap();
        // Descendant placement establishes precedent for the parent.
        assert!(store.module_has_precedent(&ModulePath::parse("m1.3").unwrap()));
        // Delete operations never establish precedent.
        assert!(!store.module_has_precedent(&ModulePath::parse("m1.4").unwrap()));
        assert!(!store.module_has_precedent(&ModulePath::parse("m2").unwrap()));
    }

    #[test]
    fn test_reserve_overflow_at_lineage_end() {
        let store = InMemorySequenceStore::new();
        assert!(matches!(
            store.reserve_next(&seq("9999")),
            Err(AssemblyError::Sequence(_))
        ));
    }

    #[test]
    fn test_parallel_reservations_are_distinct_and_consecutive() {
        let store = Arc::new(InMemorySequenceStore::new());
        let base = seq("0010");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.reserve_next(&base).unwrap())
            })
            .collect();
        let mut reserved: Vec<u32> = handles
            .into_iter()
            .map(|h| h.join().unwrap().value())
            .collect();
        reserved.sort_unstable();
        assert_eq!(reserved, (11..19).collect::<Vec<u32>>());
    }
}
