//! # Document Identity and Read-Only Document View
//!
//! The assembler consumes documents owned by an external repository; it
//! never renders, mutates, or deletes them. `Document` is the immutable
//! view handed back by a `DocumentResolver` implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// What a plan slot does to its module's content.
///
/// Serialized lowercase on every wire and file surface; unknown strings are
/// rejected at deserialization, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Add a document where none existed.
    New,
    /// Supersede a document submitted in an earlier sequence.
    Replace,
    /// Withdraw previously submitted content. Carries no file.
    Delete,
}

impl Operation {
    /// The lowercase wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }

    /// Whether this operation contributes content to the sequence tree.
    pub fn contributes_content(&self) -> bool {
        !matches!(self, Self::Delete)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "replace" => Ok(Self::Replace),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown operation {other:?}")),
        }
    }
}

/// Opaque identifier of a document in the external repository.
///
/// A newtype rather than a bare string so a document id cannot be confused
/// with a sequence id or a module path at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Wrap an identifier issued by the document repository.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, already-approved document artifact.
///
/// Owned by the external document repository; the assembler only reads the
/// binary at `storage_path` and copies it into the sequence tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Repository identifier.
    pub id: DocumentId,
    /// Human-readable title (e.g. "Clinical Study Report").
    pub title: String,
    /// Document version string (e.g. "1.0").
    pub version: String,
    /// Filesystem-safe name, when the repository provides one. Placement
    /// falls back to a sanitized title when absent.
    pub slug: Option<String>,
    /// Source location of the binary content.
    pub storage_path: PathBuf,
}
