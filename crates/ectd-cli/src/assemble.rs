//! # `ectd assemble` — Build and Publish a Sequence Offline
//!
//! Rebuilds lineage state from the backbone manifests already published
//! under the submission root, then runs the same pipeline the API service
//! runs: validation gate, scratch placement, manifest writing, atomic
//! publish.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use ectd_assembler::{
    DocumentResolver, InMemorySequenceStore, SequenceAssembler, SequenceDocument, SequenceStore,
};
use ectd_core::{ContentDigest, SequenceId};
use ectd_manifest::{BackboneManifest, BACKBONE_FILE_NAME};
use ectd_region::SharedRegionTable;

use crate::plan_file::PlanFile;
use crate::regions::load_region_table;

#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Plan file (JSON or YAML) with slots and document sources.
    #[arg(long)]
    pub plan: PathBuf,
}

pub fn run_assemble(
    args: &AssembleArgs,
    root: &Path,
    config: Option<&Path>,
) -> anyhow::Result<u8> {
    let plan_file = PlanFile::load(&args.plan)?;
    let base_dir = args
        .plan
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let (plan, resolver) = plan_file.into_parts(&base_dir);

    std::fs::create_dir_all(root)
        .with_context(|| format!("failed to create submission root {}", root.display()))?;

    let store = seed_store_from_root(root)?;
    let regions = SharedRegionTable::new(load_region_table(config)?);
    let assembler = SequenceAssembler::new(
        root,
        Arc::new(store) as Arc<dyn SequenceStore>,
        Arc::new(resolver) as Arc<dyn DocumentResolver>,
        regions,
    );

    let receipt = assembler.assemble(&plan)?;
    println!(
        "published sequence {} for {} at {}",
        receipt.sequence_id,
        receipt.region,
        receipt.published_path.display()
    );
    println!("manifest digest: {}", receipt.manifest_digest);
    for doc in &receipt.documents {
        match &doc.file_path {
            Some(path) => println!("  {} {} -> {}", doc.operation, doc.module, path),
            None => println!("  {} {} (no file)", doc.operation, doc.module),
        }
    }
    Ok(0)
}

/// Rebuild an in-memory lineage store from published sequence directories.
///
/// Each `NNNN/index.json` under the root is parsed and committed, so the
/// replace-precedent gate and stale-base advancement see the real history.
pub fn seed_store_from_root(root: &Path) -> anyhow::Result<InMemorySequenceStore> {
    let store = InMemorySequenceStore::new();
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(store),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to scan {}", root.display()));
        }
    };

    let mut manifests = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Ok(sequence_id) = SequenceId::parse(name) else {
            continue;
        };
        if name.len() != 4 {
            continue;
        }
        let index = entry.path().join(BACKBONE_FILE_NAME);
        let bytes = std::fs::read(&index)
            .with_context(|| format!("published sequence {name} has no readable index"))?;
        let manifest = BackboneManifest::from_json_bytes(&bytes)
            .with_context(|| format!("invalid backbone in {}", index.display()))?;
        manifests.push((sequence_id, manifest));
    }
    manifests.sort_by_key(|(id, _)| *id);

    for (sequence_id, manifest) in manifests {
        let documents: Vec<SequenceDocument> = manifest
            .entries
            .iter()
            .map(|entry| SequenceDocument {
                document_id: entry.document_id.clone(),
                title: entry.title.clone(),
                version: String::new(),
                module: entry.module.clone(),
                operation: entry.operation,
                file_path: entry.file_path.clone(),
                checksum: entry
                    .checksum
                    .as_deref()
                    .and_then(|c| ContentDigest::parse(c).ok()),
            })
            .collect();
        store
            .commit(sequence_id, manifest.region, documents)
            .with_context(|| format!("duplicate published sequence {sequence_id}"))?;
    }
    Ok(store)
}
