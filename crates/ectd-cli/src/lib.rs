//! # ectd-cli — Offline Toolchain for Sequence Assembly
//!
//! Subcommand handlers for the `ectd` binary. Each module exposes a
//! `run_*` function returning an exit code; `main` maps errors to exit
//! code 1.
//!
//! The CLI works against a plan file (JSON or YAML) that bundles the
//! submission plan with the document sources it references, so an assembly
//! can run without the document repository service. Lineage state is
//! rebuilt from the backbone manifests already published under the
//! submission root.

pub mod assemble;
pub mod manifest;
pub mod missing;
pub mod plan_file;
pub mod regions;
