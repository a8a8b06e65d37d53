// file: src/database/documents.rs
// description: document store collaborator holding the authoritative document state
// reference: analysis loads a document, works on a copy, saves once at the end

use crate::error::{PipelineError, Result};
use crate::models::Document;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Document>>;

    async fn save(&self, document: &Document) -> Result<()>;
}

pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    writable: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            writable: AtomicBool::new(true),
        }
    }

    pub fn insert(&self, document: Document) {
        self.documents.write().insert(document.id, document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// While unset, `save` fails and stored documents are left untouched.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.documents.read().get(&id).cloned())
    }

    async fn save(&self, document: &Document) -> Result<()> {
        if !self.writable.load(Ordering::SeqCst) {
            return Err(PipelineError::DocumentStore(format!(
                "document {} is read-only",
                document.id
            )));
        }
        self.documents.write().insert(document.id, document.clone());
        Ok(())
    }
}
