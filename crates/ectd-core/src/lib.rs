//! # ectd-core — Foundational Types for the eCTD Submission Stack
//!
//! This crate is the bedrock of the submission assembler. It defines the
//! type-system primitives that every other crate in the workspace builds on;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `ModulePath`, `SequenceId`,
//!    `DocumentId`, `Region` — all newtypes with validated constructors.
//!    No bare strings for identifiers.
//!
//! 2. **One path-resolution rule.** `ModulePath::rel_dir()` is the single
//!    place that maps a dotted CTD module path to a directory layout. The
//!    placement engine and the manifest writer both go through it, so the two
//!    can never disagree on where a document lives.
//!
//! 3. **`CanonicalBytes` newtype.** Manifest bytes and structured-artifact
//!    digests flow through `CanonicalBytes::new()` (RFC 8785). Opaque
//!    document binaries are the one exception and use `sha256_bytes()`.
//!
//! 4. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision, so sequence records canonicalize deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ectd-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a wire or a file.

pub mod canonical;
pub mod digest;
pub mod document;
pub mod error;
pub mod module_path;
pub mod region;
pub mod sequence_id;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest, DigestAlgorithm};
pub use document::{Document, DocumentId, Operation};
pub use error::{CanonicalizationError, CoreError, ModulePathError, SequenceIdError, UnknownRegion};
pub use module_path::ModulePath;
pub use region::{Region, REGION_COUNT};
pub use sequence_id::SequenceId;
pub use temporal::Timestamp;
