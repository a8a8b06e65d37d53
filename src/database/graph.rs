// file: src/database/graph.rs
// description: graph/observable store collaborator and its in-memory implementation
// reference: one view per document analysis, merged when the document registers

use crate::error::{PipelineError, Result};
use crate::extractor::ObservableAggregator;
use crate::models::{Document, DocumentFile, Observable};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewHandle {
    pub id: Uuid,
    pub document_id: Uuid,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn create_view(&self, document: &Document) -> Result<ViewHandle>;

    async fn add(
        &self,
        observables: &[Observable],
        document: &Document,
        file: Option<&DocumentFile>,
        view: &ViewHandle,
    ) -> Result<()>;

    /// Finalizes every view of `document` into its merged observable set.
    async fn merge(&self, document: &Document) -> Result<()>;
}

#[derive(Debug, Clone)]
struct ViewRecord {
    document_id: Uuid,
    entries: Vec<(Option<Uuid>, Observable)>,
}

pub struct InMemoryGraphStore {
    views: RwLock<HashMap<Uuid, ViewRecord>>,
    merged: RwLock<HashMap<Uuid, Vec<Observable>>>,
    available: AtomicBool,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            merged: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PipelineError::GraphStore("graph store offline".to_string()))
        }
    }

    pub fn view_count(&self, document_id: Uuid) -> usize {
        self.views
            .read()
            .values()
            .filter(|view| view.document_id == document_id)
            .count()
    }

    /// Everything added for `document_id` across its views, deduplicated.
    pub fn observables_for(&self, document_id: Uuid) -> Vec<Observable> {
        self.views
            .read()
            .values()
            .filter(|view| view.document_id == document_id)
            .flat_map(|view| view.entries.iter().map(|(_, o)| o.clone()))
            .collect::<ObservableAggregator>()
            .into_observables()
    }

    /// Observables added against one particular file.
    pub fn observables_for_file(&self, file_id: Uuid) -> Vec<Observable> {
        self.views
            .read()
            .values()
            .flat_map(|view| view.entries.iter())
            .filter(|(file, _)| *file == Some(file_id))
            .map(|(_, o)| o.clone())
            .collect()
    }

    pub fn merged(&self, document_id: Uuid) -> Option<Vec<Observable>> {
        self.merged.read().get(&document_id).cloned()
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn create_view(&self, document: &Document) -> Result<ViewHandle> {
        self.check_available()?;
        let handle = ViewHandle {
            id: Uuid::new_v4(),
            document_id: document.id,
        };
        self.views.write().insert(
            handle.id,
            ViewRecord {
                document_id: document.id,
                entries: Vec::new(),
            },
        );
        Ok(handle)
    }

    async fn add(
        &self,
        observables: &[Observable],
        document: &Document,
        file: Option<&DocumentFile>,
        view: &ViewHandle,
    ) -> Result<()> {
        self.check_available()?;
        let mut views = self.views.write();
        let record = views
            .get_mut(&view.id)
            .filter(|record| record.document_id == document.id)
            .ok_or_else(|| {
                PipelineError::GraphStore(format!(
                    "view {} does not belong to document {}",
                    view.id, document.id
                ))
            })?;
        let file_id = file.map(|f| f.id);
        record
            .entries
            .extend(observables.iter().cloned().map(|o| (file_id, o)));
        Ok(())
    }

    async fn merge(&self, document: &Document) -> Result<()> {
        self.check_available()?;
        let observables = self.observables_for(document.id);
        self.merged.write().insert(document.id, observables);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservableType;

    #[tokio::test]
    async fn test_add_and_merge() {
        let store = InMemoryGraphStore::new();
        let file = DocumentFile::new("r.txt", "text/plain", vec![]);
        let doc = Document::new(vec![file.clone()]);

        let view = store.create_view(&doc).await.unwrap();
        let ip = Observable::new(ObservableType::Ipv4, "1.2.3.4");
        store.add(&[ip.clone()], &doc, Some(&file), &view).await.unwrap();
        store.add(&[ip.clone()], &doc, None, &view).await.unwrap();

        assert_eq!(store.observables_for_file(file.id), vec![ip.clone()]);
        assert!(store.merged(doc.id).is_none());

        store.merge(&doc).await.unwrap();
        assert_eq!(store.merged(doc.id), Some(vec![ip]));
    }

    #[tokio::test]
    async fn test_add_rejects_foreign_view() {
        let store = InMemoryGraphStore::new();
        let a = Document::new(vec![]);
        let b = Document::new(vec![]);
        let view = store.create_view(&a).await.unwrap();
        assert!(store.add(&[], &b, None, &view).await.is_err());
    }

    #[tokio::test]
    async fn test_offline() {
        let store = InMemoryGraphStore::new();
        store.set_available(false);
        let doc = Document::new(vec![]);
        assert!(matches!(
            store.create_view(&doc).await,
            Err(PipelineError::GraphStore(_))
        ));
    }
}
