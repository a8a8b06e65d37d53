// file: src/database/tags.rs
// description: tag and facet backing store contract with an in-memory implementation
// reference: unique (facet, upper(label)) and unique prefix constraints

use crate::error::StoreError;
use crate::models::{Tag, TagFacet};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lookups return `Ok(None)` when nothing matches. `create_*` may fail with
/// [`StoreError::Conflict`] when a concurrent writer got there first.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn find_facet(&self, prefix: &str) -> StoreResult<Option<TagFacet>>;

    async fn create_facet(&self, prefix: &str) -> StoreResult<TagFacet>;

    /// Label comparison is case-insensitive.
    async fn find_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Option<Tag>>;

    async fn create_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Tag>;
}

pub struct InMemoryTagStore {
    facets: RwLock<HashMap<String, TagFacet>>,
    tags: RwLock<HashMap<(Uuid, String), Tag>>,
    facet_creates: AtomicUsize,
    tag_creates: AtomicUsize,
    available: AtomicBool,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self {
            facets: RwLock::new(HashMap::new()),
            tags: RwLock::new(HashMap::new()),
            facet_creates: AtomicUsize::new(0),
            tag_creates: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Number of successful `create_facet` calls.
    pub fn facet_creates(&self) -> usize {
        self.facet_creates.load(Ordering::SeqCst)
    }

    /// Number of successful `create_tag` calls.
    pub fn tag_creates(&self) -> usize {
        self.tag_creates.load(Ordering::SeqCst)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.read().len()
    }

    /// Simulates an outage; every call fails with `Unavailable` while unset.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("tag store offline".to_string()))
        }
    }
}

impl Default for InMemoryTagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn find_facet(&self, prefix: &str) -> StoreResult<Option<TagFacet>> {
        self.check_available()?;
        Ok(self.facets.read().get(prefix).cloned())
    }

    async fn create_facet(&self, prefix: &str) -> StoreResult<TagFacet> {
        self.check_available()?;
        let mut facets = self.facets.write();
        if facets.contains_key(prefix) {
            return Err(StoreError::Conflict(format!("facet {}", prefix)));
        }
        let facet = TagFacet::new(prefix);
        facets.insert(prefix.to_string(), facet.clone());
        self.facet_creates.fetch_add(1, Ordering::SeqCst);
        Ok(facet)
    }

    async fn find_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Option<Tag>> {
        self.check_available()?;
        Ok(self.tags.read().get(&Tag::lookup_key(facet_id, label)).cloned())
    }

    async fn create_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Tag> {
        self.check_available()?;
        let key = Tag::lookup_key(facet_id, label);
        let mut tags = self.tags.write();
        if tags.contains_key(&key) {
            return Err(StoreError::Conflict(format!("tag {}", label)));
        }
        let tag = Tag::new(facet_id, label);
        tags.insert(key, tag.clone());
        self.tag_creates.fetch_add(1, Ordering::SeqCst);
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_facet_get_or_conflict() {
        let store = InMemoryTagStore::new();
        assert!(store.find_facet("actor").await.unwrap().is_none());

        let facet = store.create_facet("actor").await.unwrap();
        assert_eq!(facet.title, "actor");
        assert_eq!(store.find_facet("actor").await.unwrap(), Some(facet));
        assert!(matches!(
            store.create_facet("actor").await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.facet_creates(), 1);
    }

    #[tokio::test]
    async fn test_tag_lookup_is_case_insensitive() {
        let store = InMemoryTagStore::new();
        let facet = store.create_facet("actor").await.unwrap();
        let tag = store.create_tag(facet.id, "APT29").await.unwrap();

        assert_eq!(store.find_tag(facet.id, "apt29").await.unwrap(), Some(tag));
        assert!(store.create_tag(facet.id, "Apt29").await.is_err());
        assert!(store.find_tag(Uuid::new_v4(), "APT29").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = InMemoryTagStore::new();
        store.set_available(false);
        assert!(matches!(
            store.find_facet("actor").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
