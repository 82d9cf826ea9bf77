//! # Required-Document Checker
//!
//! [`find_missing`] answers one question: given the slots of a submission
//! plan and a region profile, which required modules does the plan leave
//! uncovered?
//!
//! A required module is satisfied by any slot whose path equals the required
//! path or descends from it, provided the slot adds or replaces content.
//! Delete slots remove content and never satisfy a requirement. The checker
//! is pure: it runs before any side effect during assembly, again as a
//! post-commit audit, and standalone behind the preview endpoint, always
//! producing the same answer for the same inputs.

use ectd_core::ModulePath;

use crate::profile::RegionProfile;

/// One plan slot, viewed through the only two facts the checker needs.
///
/// The plan types live upstream of this crate; they implement this trait
/// rather than this crate depending on them.
pub trait CoverageSlot {
    /// The CTD module this slot targets.
    fn module(&self) -> &ModulePath;
    /// Whether the slot contributes content (`new`/`replace`).
    ///
    /// Delete slots return `false`: removing a document never satisfies a
    /// required module.
    fn contributes_content(&self) -> bool;
}

/// Required modules the given slots leave uncovered, in profile order.
pub fn find_missing<S: CoverageSlot>(
    slots: &[S],
    profile: &RegionProfile,
) -> Vec<ModulePath> {
    profile
        .required_modules
        .iter()
        .filter(|required| {
            !slots.iter().any(|slot| {
                slot.contributes_content() && slot.module().is_within(required)
            })
        })
        .cloned()
        .collect()
}
