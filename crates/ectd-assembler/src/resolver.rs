//! # Document Resolution
//!
//! The assembler never owns document content; it asks a
//! [`DocumentResolver`] for an immutable view of each approved artifact.
//! Production deployments back this trait with the document repository
//! service; tests and the CLI use [`InMemoryDocumentStore`].

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use ectd_core::{Document, DocumentId};

/// Failure to resolve a plan's document reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The repository has no document with this id.
    #[error("document {0} not found")]
    NotFound(DocumentId),
}

/// Read-only access to the external document repository.
pub trait DocumentResolver: Send + Sync {
    /// Resolve a document id to its immutable artifact view.
    fn resolve(&self, id: &DocumentId) -> Result<Document, ResolveError>;
}

/// In-memory resolver for tests and offline CLI runs.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document, replacing any previous registration.
    pub fn insert(&self, document: Document) {
        self.documents
            .write()
            .insert(document.id.clone(), document);
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentResolver for InMemoryDocumentStore {
    fn resolve(&self, id: &DocumentId) -> Result<Document, ResolveError> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.clone()))
    }
}
