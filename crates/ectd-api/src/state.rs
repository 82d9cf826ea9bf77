//! # Application State
//!
//! One [`AppState`] is built at startup and cloned into every handler. The
//! assembler and the region table handle are shared; configuration is
//! read-only after startup.

use std::path::PathBuf;
use std::sync::Arc;

use ectd_assembler::{
    DocumentResolver, InMemoryDocumentStore, InMemorySequenceStore, SequenceAssembler,
    SequenceStore,
};
use ectd_region::{RegionRuleTable, SharedRegionTable};

/// Startup configuration for the API service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Submission root the assembler publishes into.
    pub root: PathBuf,
    /// Region rule YAML, when the deployment overrides the built-ins.
    /// Required for `POST /v1/regions/reload`.
    pub regions_config: Option<PathBuf>,
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The assembly pipeline.
    pub assembler: Arc<SequenceAssembler>,
    /// Hot-reloadable region rule table.
    pub regions: SharedRegionTable,
    /// Startup configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state around an existing assembler.
    pub fn new(assembler: Arc<SequenceAssembler>, regions: SharedRegionTable, config: AppConfig) -> Self {
        Self {
            assembler,
            regions,
            config: Arc::new(config),
        }
    }

    /// Build a self-contained state with in-memory stores.
    ///
    /// Used by the binary's default mode and by router tests; a deployment
    /// wiring in a real document repository constructs the assembler itself
    /// and uses [`AppState::new`].
    pub fn in_memory(config: AppConfig, resolver: Arc<InMemoryDocumentStore>) -> Self {
        let regions = match &config.regions_config {
            Some(path) => {
                // An unloadable config falls back to the built-ins; a later
                // reload through the API can pick up the fixed file.
                match RegionRuleTable::load(path) {
                    Ok(table) => SharedRegionTable::new(table),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err,
                            "failed to load region config, using built-in profiles");
                        SharedRegionTable::default()
                    }
                }
            }
            None => SharedRegionTable::default(),
        };
        let store: Arc<dyn SequenceStore> = Arc::new(InMemorySequenceStore::new());
        let assembler = Arc::new(SequenceAssembler::new(
            config.root.clone(),
            store,
            resolver as Arc<dyn DocumentResolver>,
            regions.clone(),
        ));
        Self::new(assembler, regions, config)
    }
}
