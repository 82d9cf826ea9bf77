//! # ectd-region — Region Rule Tables and the Required-Document Checker
//!
//! Each target health authority (FDA, EMA, PMDA) carries a [`RegionProfile`]
//! describing which CTD modules a submission sequence must cover, which
//! modules admit at most one document, and which subtrees accept arbitrarily
//! many. Profiles live in a [`RegionRuleTable`] with built-in defaults,
//! overridable from YAML configuration and hot-reloadable at runtime through
//! [`SharedRegionTable`].
//!
//! The required-document checker ([`find_missing`]) is a pure function over a
//! plan's slots and a profile. It runs before any filesystem side effect and
//! again as a post-commit audit, so it takes no locks and touches no state.

pub mod checker;
pub mod profile;

pub use checker::{find_missing, CoverageSlot};
pub use profile::{
    RegionConfigError, RegionProfile, RegionRuleTable, SharedRegionTable,
};
