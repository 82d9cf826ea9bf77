//! # Placement Engine
//!
//! Copies each plan slot's document binary into the CTD directory layout
//! under a scratch root. Placement is deterministic: plan order decides
//! collision suffixes, so re-running the same plan produces an identical
//! tree byte for byte.
//!
//! Documents are copied, never moved; the repository remains the owner of
//! the source binaries. Each copied file's SHA-256 checksum is recorded for
//! the backbone manifest.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ectd_core::{sha256_bytes, ContentDigest, DocumentId, ModulePath, Operation};

use crate::error::AssemblyError;
use crate::plan::DocSlot;
use crate::resolver::DocumentResolver;

/// One placed (or withdrawn) document in a sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceDocument {
    /// Repository identifier.
    pub document_id: DocumentId,
    /// Title recorded in the backbone.
    pub title: String,
    /// Version recorded in the backbone.
    pub version: String,
    /// Target CTD module.
    pub module: ModulePath,
    /// The slot's operation.
    pub operation: Operation,
    /// Path relative to the sequence root, forward-slash separated.
    /// `None` for delete operations.
    pub file_path: Option<String>,
    /// Checksum of the placed file. Present exactly when `file_path` is.
    pub checksum: Option<ContentDigest>,
}

impl ectd_region::CoverageSlot for SequenceDocument {
    fn module(&self) -> &ModulePath {
        &self.module
    }

    fn contributes_content(&self) -> bool {
        self.operation.contributes_content()
    }
}

/// Place every slot of a plan under `scratch_root`.
///
/// Slots are processed in plan order. A failed resolution or copy aborts
/// the whole placement; the caller discards the scratch directory.
pub fn place(
    scratch_root: &Path,
    slots: &[DocSlot],
    resolver: &dyn DocumentResolver,
) -> Result<Vec<SequenceDocument>, AssemblyError> {
    let mut placed = Vec::with_capacity(slots.len());
    // Names already taken per module directory, for collision suffixing.
    let mut taken: HashMap<PathBuf, HashSet<String>> = HashMap::new();

    for slot in slots {
        if slot.operation == Operation::Delete {
            placed.push(SequenceDocument {
                document_id: slot.document_id.clone(),
                title: slot.title.clone(),
                version: slot.version.clone(),
                module: slot.module.clone(),
                operation: slot.operation,
                file_path: None,
                checksum: None,
            });
            continue;
        }

        let document = resolver.resolve(&slot.document_id)?;

        let rel_dir = slot.module.rel_dir();
        let dir = scratch_root.join(&rel_dir);
        std::fs::create_dir_all(&dir).map_err(|e| AssemblyError::staging(&dir, e))?;

        let stem = sanitize_file_stem(document.slug.as_deref().unwrap_or(&document.title));
        let extension = document
            .storage_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let names = taken.entry(dir.clone()).or_default();
        let file_name = next_free_name(&stem, extension.as_deref(), names);
        names.insert(file_name.clone());

        let dest = dir.join(&file_name);
        let bytes = std::fs::read(&document.storage_path)
            .map_err(|e| AssemblyError::staging(&document.storage_path, e))?;
        std::fs::write(&dest, &bytes).map_err(|e| AssemblyError::staging(&dest, e))?;

        let rel_path = slot
            .module
            .segments()
            .chain(std::iter::once(file_name.as_str()))
            .collect::<Vec<_>>()
            .join("/");

        tracing::debug!(
            document_id = %slot.document_id,
            module = %slot.module,
            path = %rel_path,
            "document placed"
        );

        placed.push(SequenceDocument {
            document_id: slot.document_id.clone(),
            title: slot.title.clone(),
            version: slot.version.clone(),
            module: slot.module.clone(),
            operation: slot.operation,
            file_path: Some(rel_path),
            checksum: Some(sha256_bytes(&bytes)),
        });
    }

    Ok(placed)
}

/// Reduce a slug or title to a filesystem-safe file stem.
///
/// Lowercased; whitespace becomes `-`; path separators, control characters,
/// and reserved characters are stripped; runs of `-` collapse. An input
/// with nothing usable falls back to `document`.
fn sanitize_file_stem(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = false;
    for c in input.trim().chars() {
        let mapped = match c {
            c if c.is_whitespace() => Some('-'),
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => None,
            c if c.is_control() => None,
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            '-' | '_' | '.' => Some(c),
            _ => None,
        };
        match mapped {
            Some('-') if last_dash => {}
            Some('-') => {
                out.push('-');
                last_dash = true;
            }
            Some(c) => {
                out.push(c);
                last_dash = false;
            }
            None => {}
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The first `{stem}.{ext}` / `{stem}-N.{ext}` name not yet taken in a
/// directory. Suffixes count up from 2 in plan order, so the same plan
/// always yields the same names.
fn next_free_name(stem: &str, extension: Option<&str>, taken: &HashSet<String>) -> String {
    let compose = |stem: &str| match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    };
    let candidate = compose(stem);
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 2u32;
    loop {
        let candidate = compose(&format!("{stem}-{n}"));
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
