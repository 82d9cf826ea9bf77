//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the submission stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parse errors carry the rejected input so callers can report it verbatim.
//! - Validation failures are structured, never bare strings, so the API layer
//!   can emit machine-readable error bodies.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Module path failed validation.
    #[error("module path error: {0}")]
    ModulePath(#[from] ModulePathError),

    /// Sequence identifier failed validation or overflowed.
    #[error("sequence id error: {0}")]
    SequenceId(#[from] SequenceIdError),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Timestamp parsing or normalization failed.
    #[error("timestamp error: {0}")]
    Timestamp(String),
}

/// The region code is not one of the configured set.
///
/// Raised only after a case-insensitive retry has also failed, per the
/// region lookup contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown region: {0:?}")]
pub struct UnknownRegion(pub String);

/// Error validating a CTD module path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModulePathError {
    /// The path was empty after normalization.
    #[error("module path is empty")]
    Empty,

    /// The leading segment is not a CTD module (`m1`..`m5`).
    #[error("module path {path:?} must start with a CTD module m1-m5, got segment {segment:?}")]
    BadRoot {
        /// The full rejected path.
        path: String,
        /// The offending first segment.
        segment: String,
    },

    /// A segment is empty or contains characters outside `[0-9a-z]`.
    #[error("module path {path:?} has invalid segment {segment:?}")]
    BadSegment {
        /// The full rejected path.
        path: String,
        /// The offending segment.
        segment: String,
    },
}

/// Error validating or advancing a sequence identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceIdError {
    /// The input is not a non-negative decimal integer string.
    #[error("invalid base sequence {0:?}: not a non-negative integer string")]
    InvalidBaseSequence(String),

    /// Incrementing would exceed the 4-digit regulatory cap (9999).
    #[error("sequence overflow: incrementing {0} would exceed 9999")]
    SequenceOverflow(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Manifests carry strings and integers only.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
