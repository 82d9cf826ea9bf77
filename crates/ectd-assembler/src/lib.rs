//! # ectd-assembler — Building and Publishing Submission Sequences
//!
//! This crate turns a validated [`SubmissionPlan`] into a published sequence
//! directory: it allocates the next sequence number, checks the plan against
//! the region's rules, copies approved documents into the CTD directory
//! layout, writes the backbone manifest, and publishes the finished tree with
//! a single atomic rename.
//!
//! ## Pipeline
//!
//! The orchestrator ([`SequenceAssembler`]) drives a strict phase order:
//!
//! ```text
//! Planned -> Numbered -> Validated -> Placed -> Manifested -> Committed
//!                \______________________________________/
//!            failure before commit -> Aborted (no residue)
//! ```
//!
//! All filesystem work before commit happens in a scratch directory under
//! `<root>/.staging/`; a consumer scanning the submission root never observes
//! a half-built sequence. Every phase change is logged in the receipt's
//! transition records.

pub mod allocator;
pub mod error;
pub mod orchestrator;
pub mod placement;
pub mod plan;
pub mod resolver;
pub mod store;

pub use allocator::next_sequence;
pub use error::AssemblyError;
pub use orchestrator::{
    AssemblyPolicy, AssemblyReceipt, Phase, PhaseTransition, SequenceAssembler,
};
pub use placement::{place, SequenceDocument};
pub use plan::{DocSlot, SubmissionPlan};
pub use resolver::{DocumentResolver, InMemoryDocumentStore, ResolveError};
pub use store::{CommittedSequence, InMemorySequenceStore, SequenceStore};
