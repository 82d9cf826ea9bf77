//! # `ectd manifest verify` — Backbone Verification
//!
//! Re-parses a published `index.json` and checks every recorded file
//! against the sequence tree: the file must exist and its SHA-256 must
//! match the recorded checksum. Exit code 0 when the tree verifies, 2 on
//! any mismatch.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use ectd_core::{sha256_bytes, ContentDigest};
use ectd_manifest::{BackboneManifest, BACKBONE_FILE_NAME};

#[derive(Args, Debug)]
pub struct ManifestArgs {
    #[command(subcommand)]
    pub command: ManifestCommand,
}

#[derive(Subcommand, Debug)]
pub enum ManifestCommand {
    /// Verify a sequence tree against its backbone index.
    Verify {
        /// Path to `index.json` or to the sequence directory containing it.
        path: PathBuf,
    },
}

pub fn run_manifest(args: &ManifestArgs) -> anyhow::Result<u8> {
    match &args.command {
        ManifestCommand::Verify { path } => verify(path),
    }
}

fn verify(path: &Path) -> anyhow::Result<u8> {
    let index_path = if path.is_dir() {
        path.join(BACKBONE_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let sequence_root = index_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let bytes = std::fs::read(&index_path)
        .with_context(|| format!("failed to read {}", index_path.display()))?;
    let manifest = BackboneManifest::from_json_bytes(&bytes)
        .with_context(|| format!("invalid backbone in {}", index_path.display()))?;

    let mut failures = 0usize;
    let mut verified = 0usize;
    for entry in &manifest.entries {
        let (Some(file_path), Some(checksum)) = (&entry.file_path, &entry.checksum) else {
            continue;
        };
        let expected = match ContentDigest::parse(checksum) {
            Ok(digest) => digest,
            Err(_) => {
                println!("BAD CHECKSUM FORMAT  {file_path}");
                failures += 1;
                continue;
            }
        };
        let on_disk = sequence_root.join(file_path);
        match std::fs::read(&on_disk) {
            Ok(content) if sha256_bytes(&content) == expected => verified += 1,
            Ok(_) => {
                println!("CHECKSUM MISMATCH    {file_path}");
                failures += 1;
            }
            Err(_) => {
                println!("MISSING FILE         {file_path}");
                failures += 1;
            }
        }
    }

    println!(
        "sequence {}: {verified} file(s) verified, {failures} failure(s)",
        manifest.sequence_id
    );
    Ok(if failures == 0 { 0 } else { 2 })
}
