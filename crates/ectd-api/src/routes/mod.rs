//! Route modules, one per API domain.

pub mod regions;
pub mod sequences;
