//! # ectd-manifest — Backbone Index and Regional Extensions
//!
//! Every published sequence carries a backbone manifest (`index.json`) at its
//! root: the machine-readable table of contents a receiving gateway validates
//! before anything else. This crate owns that format.
//!
//! Manifests serialize through `CanonicalBytes` (RFC 8785), so writing the
//! same manifest twice produces byte-identical files and a stable digest.
//! Parsing a written manifest reproduces exactly the entries that went in.
//!
//! Regional extensions ride alongside the backbone: EMA sequences get an
//! `eu_regional.json` envelope; the PMDA envelope is a declared but
//! unimplemented slot that warns when reached rather than silently writing
//! nothing.

pub mod backbone;
pub mod error;
pub mod regional;

pub use backbone::{BackboneManifest, ManifestEntry, BACKBONE_FILE_NAME};
pub use error::ManifestError;
pub use regional::{extension_for_region, EuRegionalMetadata, ExtensionSlot, EU_REGIONAL_FILE_NAME};
