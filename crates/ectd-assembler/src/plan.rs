//! # Submission Plans
//!
//! A [`SubmissionPlan`] is the caller's declaration of intent: the lineage's
//! last known sequence, the target region, and one [`DocSlot`] per document
//! operation. Plans arrive over the API or from a CLI plan file and are
//! validated structurally before the pipeline touches anything.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use ectd_core::{DocumentId, ModulePath, Operation};
use ectd_manifest::EuRegionalMetadata;
use ectd_region::{CoverageSlot, RegionProfile};

use crate::error::AssemblyError;

/// One planned document operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSlot {
    /// Repository identifier of the document.
    pub document_id: DocumentId,
    /// Title recorded in the backbone. May differ from the repository title
    /// when the submission uses a region-specific display name.
    pub title: String,
    /// Version string recorded in the backbone.
    pub version: String,
    /// Target CTD module.
    pub module: ModulePath,
    /// What this slot does to the module's content.
    pub operation: Operation,
}

impl CoverageSlot for DocSlot {
    fn module(&self) -> &ModulePath {
        &self.module
    }

    fn contributes_content(&self) -> bool {
        self.operation.contributes_content()
    }
}

/// A complete plan for one new sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPlan {
    /// The lineage's last published sequence, as the caller knows it
    /// (e.g. `"0003"`). Parsed and, if stale, advanced during numbering.
    pub base_sequence: String,
    /// Target agency.
    pub region: ectd_core::Region,
    /// Planned operations, in submission order.
    pub slots: Vec<DocSlot>,
    /// EU envelope metadata. Required when `region` is EMA.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub eu_regional: Option<EuRegionalMetadata>,
}

impl SubmissionPlan {
    /// Structural validation against a region profile.
    ///
    /// Checks the rules that do not need store state: singleton modules get
    /// at most one content-bearing slot, and duplicate `new` slots on one
    /// module are rejected outside multi-document subtrees. The
    /// missing-required check and the replace-precedent gate run separately
    /// in the orchestrator.
    pub fn validate_structure(&self, profile: &RegionProfile) -> Result<(), AssemblyError> {
        let mut singleton_hits: HashMap<&ModulePath, usize> = HashMap::new();
        let mut new_slots_seen: BTreeSet<&ModulePath> = BTreeSet::new();

        for slot in &self.slots {
            if !slot.operation.contributes_content() {
                continue;
            }
            if profile.is_singleton(&slot.module) {
                *singleton_hits.entry(&slot.module).or_insert(0) += 1;
            }
            if slot.operation == Operation::New && !profile.allows_multiple(&slot.module) {
                if !new_slots_seen.insert(&slot.module) {
                    return Err(AssemblyError::DuplicateSlot {
                        module: slot.module.clone(),
                    });
                }
            }
        }

        let mut duplicated: Vec<ModulePath> = singleton_hits
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(module, _)| module.clone())
            .collect();
        if !duplicated.is_empty() {
            duplicated.sort();
            return Err(AssemblyError::DuplicateSingletonModule(duplicated));
        }

        Ok(())
    }

    /// Modules targeted by `replace` slots, deduplicated and ordered.
    pub fn replace_modules(&self) -> Vec<&ModulePath> {
        let set: BTreeSet<&ModulePath> = self
            .slots
            .iter()
            .filter(|s| s.operation == Operation::Replace)
            .map(|s| &s.module)
            .collect();
        set.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ectd_core::Region;
    use ectd_region::RegionRuleTable;

    fn slot(id: &str, module: &str, operation: Operation) -> DocSlot {
        DocSlot {
            document_id: DocumentId::new(id),
            title: format!("Document {id}"),
            version: "1.0".to_string(),
            module: ModulePath::parse(module).unwrap(),
            operation,
        }
    }

    fn plan(slots: Vec<DocSlot>) -> SubmissionPlan {
        SubmissionPlan {
            base_sequence: "0003".to_string(),
            region: Region::Ema,
            slots,
            eu_regional: None,
        }
    }

    fn ema() -> RegionProfile {
        RegionRuleTable::builtin()
            .profile(Region::Ema)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_valid_plan_passes() {
        let p = plan(vec![
            slot("a", "m1.0", Operation::New),
            slot("b", "m1.2", Operation::Replace),
            slot("c", "m3.2.s", Operation::New),
            slot("d", "m3.2.s", Operation::New),
        ]);
        assert!(p.validate_structure(&ema()).is_ok());
    }

    #[test]
    fn test_duplicate_singleton_rejected() {
        let p = plan(vec![
            slot("a", "m1.2", Operation::New),
            slot("b", "m1.2", Operation::Replace),
        ]);
        match p.validate_structure(&ema()).unwrap_err() {
            AssemblyError::DuplicateSingletonModule(modules) => {
                assert_eq!(modules.len(), 1);
                assert_eq!(modules[0].as_str(), "m1.2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_new_outside_multidoc_rejected() {
        // m1.4 is not a singleton but also not multi-document.
        let p = plan(vec![
            slot("a", "m1.4", Operation::New),
            slot("b", "m1.4", Operation::New),
        ]);
        assert!(matches!(
            p.validate_structure(&ema()),
            Err(AssemblyError::DuplicateSlot { .. })
        ));
    }

    #[test]
    fn test_duplicate_new_inside_multidoc_allowed() {
        let p = plan(vec![
            slot("a", "m5.3.5", Operation::New),
            slot("b", "m5.3.5", Operation::New),
        ]);
        assert!(p.validate_structure(&ema()).is_ok());
    }

    #[test]
    fn test_delete_slots_exempt_from_singleton_rule() {
        // Withdrawing and resubmitting a singleton in one sequence is fine.
        let p = plan(vec![
            slot("a", "m1.2", Operation::Delete),
            slot("b", "m1.2", Operation::New),
        ]);
        assert!(p.validate_structure(&ema()).is_ok());
    }

    #[test]
    fn test_replace_modules_deduplicated() {
        let p = plan(vec![
            slot("a", "m1.2", Operation::Replace),
            slot("b", "m1.3", Operation::Replace),
            slot("c", "m1.2", Operation::Replace),
        ]);
        let modules: Vec<&str> = p.replace_modules().iter().map(|m| m.as_str()).collect();
        assert_eq!(modules, vec!["m1.2", "m1.3"]);
    }

    #[test]
    fn test_plan_deserializes_from_json() {
        let json = r#"{
            "base_sequence": "0003",
            "region": "EMA",
            "slots": [
                {
                    "document_id": "doc-1",
                    "title": "Cover Letter",
                    "version": "1.0",
                    "module": "m1.0",
                    "operation": "new"
                }
            ],
            "eu_regional": {
                "procedure_type": "centralised",
                "applicant_name": "Acme Pharma B.V."
            }
        }"#;
        let p: SubmissionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(p.base_sequence, "0003");
        assert_eq!(p.slots.len(), 1);
        assert_eq!(p.slots[0].operation, Operation::New);
        assert!(p.eu_regional.is_some());
    }

    #[test]
    fn test_plan_rejects_unknown_operation() {
        let json = r#"{
            "base_sequence": "0003",
            "region": "EMA",
            "slots": [
                {
                    "document_id": "doc-1",
                    "title": "Cover Letter",
                    "version": "1.0",
                    "module": "m1.0",
                    "operation": "append"
                }
            ]
        }"#;
        assert!(serde_json::from_str::<SubmissionPlan>(json).is_err());
    }
}
