// file: src/tagging/resolver.rs
// description: resolves "prefix:label" strings into persisted tags with get-or-create semantics
// reference: rewrite chain -> facet lookup -> tag lookup, backed by a per-run cache

use crate::database::{RewriteRuleSource, StoreResult, TagStore};
use crate::error::{Result, StoreError};
use crate::models::{LabelRef, Tag, TagFacet};
use crate::tagging::rewrite::RewriteChain;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Facets and tags seen during one analysis run. Build a fresh one per
/// document; it must never be shared between concurrent analyses.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    facets: HashMap<String, TagFacet>,
    tags: HashMap<(Uuid, String), Tag>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facet(&self, prefix: &str) -> Option<&TagFacet> {
        self.facets.get(prefix)
    }

    pub fn facet_by_id(&self, id: Uuid) -> Option<&TagFacet> {
        self.facets.values().find(|facet| facet.id == id)
    }

    pub fn tag(&self, facet_id: Uuid, label: &str) -> Option<&Tag> {
        self.tags.get(&Tag::lookup_key(facet_id, label))
    }

    /// `prefix:label` when the tag's facet passed through this cache.
    pub fn display_label(&self, tag: &Tag) -> String {
        match self.facet_by_id(tag.facet_id) {
            Some(facet) => format!("{}:{}", facet.prefix, tag.label),
            None => tag.label.clone(),
        }
    }

    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

pub struct TagResolver {
    chain: RewriteChain,
}

impl TagResolver {
    pub fn new(chain: RewriteChain) -> Self {
        Self { chain }
    }

    /// Reads the current rule sets and compiles them.
    pub async fn load(source: &dyn RewriteRuleSource) -> Result<Self> {
        let rule_sets = source.rule_sets().await?;
        Ok(Self::new(RewriteChain::compile(&rule_sets)))
    }

    pub fn rewrite(&self, label: &str) -> Vec<String> {
        self.chain.apply(label)
    }

    /// Resolves every label, skipping malformed ones and any that hit a store
    /// error. The result holds each tag once.
    pub async fn resolve_labels<S>(
        &self,
        labels: &[S],
        cache: &mut ResolutionCache,
        store: &dyn TagStore,
    ) -> Vec<Tag>
    where
        S: AsRef<str> + Sync,
    {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        for raw in labels {
            for label in self.chain.apply(raw.as_ref()) {
                let Some(parsed) = LabelRef::parse(&label) else {
                    debug!(label = %label, "Skipping malformed label");
                    continue;
                };

                let facet = match resolve_facet(parsed.prefix, cache, store).await {
                    Ok(facet) => facet,
                    Err(e) => {
                        warn!(prefix = %parsed.prefix, label = %parsed.label, "Failed to resolve facet: {}", e);
                        continue;
                    }
                };

                match resolve_tag(&facet, parsed.label, cache, store).await {
                    Ok(tag) => {
                        if seen.insert(tag.id) {
                            resolved.push(tag);
                        }
                    }
                    Err(e) => {
                        warn!(prefix = %parsed.prefix, label = %parsed.label, "Failed to resolve tag: {}", e);
                    }
                }
            }
        }

        resolved
    }
}

async fn resolve_facet(
    prefix: &str,
    cache: &mut ResolutionCache,
    store: &dyn TagStore,
) -> StoreResult<TagFacet> {
    if let Some(facet) = cache.facets.get(prefix) {
        return Ok(facet.clone());
    }

    let facet = match store.find_facet(prefix).await? {
        Some(facet) => facet,
        None => match store.create_facet(prefix).await {
            Ok(facet) => facet,
            Err(StoreError::Conflict(_)) => {
                debug!(prefix = %prefix, "Facet created concurrently, re-reading");
                store
                    .find_facet(prefix)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("facet {}", prefix)))?
            }
            Err(e) => return Err(e),
        },
    };

    cache.facets.insert(prefix.to_string(), facet.clone());
    Ok(facet)
}

async fn resolve_tag(
    facet: &TagFacet,
    label: &str,
    cache: &mut ResolutionCache,
    store: &dyn TagStore,
) -> StoreResult<Tag> {
    let key = Tag::lookup_key(facet.id, label);
    if let Some(tag) = cache.tags.get(&key) {
        return Ok(tag.clone());
    }

    let tag = match store.find_tag(facet.id, label).await? {
        Some(tag) => tag,
        None => match store.create_tag(facet.id, label).await {
            Ok(tag) => tag,
            Err(StoreError::Conflict(_)) => {
                debug!(prefix = %facet.prefix, label = %label, "Tag created concurrently, re-reading");
                store
                    .find_tag(facet.id, label)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("tag {}:{}", facet.prefix, label)))?
            }
            Err(e) => return Err(e),
        },
    };

    cache.tags.insert(key, tag.clone());
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ConfigRuleSource, InMemoryTagStore};
    use crate::models::{RewriteRule, RewriteRuleSet};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn plain_resolver() -> TagResolver {
        TagResolver::new(RewriteChain::default())
    }

    #[tokio::test]
    async fn test_same_label_creates_once_per_cache() {
        let store = InMemoryTagStore::new();
        let resolver = plain_resolver();
        let mut cache = ResolutionCache::new();

        let first = resolver.resolve_labels(&["actor:APT29"], &mut cache, &store).await;
        let second = resolver
            .resolve_labels(&["actor:APT29", "actor:apt29"], &mut cache, &store)
            .await;

        assert_eq!(store.tag_creates(), 1);
        assert_eq!(store.facet_creates(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.display_label(&first[0]), "actor:APT29");
    }

    #[tokio::test]
    async fn test_fresh_cache_reuses_stored_tag() {
        let store = InMemoryTagStore::new();
        let resolver = plain_resolver();

        let a = resolver
            .resolve_labels(&["actor:APT29"], &mut ResolutionCache::new(), &store)
            .await;
        let b = resolver
            .resolve_labels(&["actor:APT29"], &mut ResolutionCache::new(), &store)
            .await;

        assert_eq!(a, b);
        assert_eq!(store.tag_creates(), 1);
    }

    #[tokio::test]
    async fn test_expansion_yields_independent_tags() {
        let store = InMemoryTagStore::new();
        let source = ConfigRuleSource::new(vec![RewriteRuleSet {
            name: "expand".to_string(),
            position: 0,
            rules: vec![RewriteRule {
                search: "^combo$".to_string(),
                replacement: "a:x,b:y".to_string(),
                position: 0,
            }],
        }]);
        let resolver = TagResolver::load(&source).await.unwrap();
        let mut cache = ResolutionCache::new();

        let tags = resolver.resolve_labels(&["combo"], &mut cache, &store).await;
        let labels: Vec<_> = tags.iter().map(|t| cache.display_label(t)).collect();
        assert_eq!(labels, vec!["a:x", "b:y"]);
        assert_ne!(tags[0].facet_id, tags[1].facet_id);
    }

    #[tokio::test]
    async fn test_malformed_labels_are_skipped() {
        let store = InMemoryTagStore::new();
        let tags = plain_resolver()
            .resolve_labels(&["nocolon", ":x", "y:", "ok:1"], &mut ResolutionCache::new(), &store)
            .await;
        assert_eq!(tags.len(), 1);
        assert_eq!(store.tag_creates(), 1);
    }

    #[tokio::test]
    async fn test_store_outage_skips_labels() {
        let store = InMemoryTagStore::new();
        store.set_available(false);
        let tags = plain_resolver()
            .resolve_labels(&["actor:APT29"], &mut ResolutionCache::new(), &store)
            .await;
        assert!(tags.is_empty());
    }

    /// Hides existing tags from the first lookup, like a concurrent writer
    /// committing between our find and create.
    struct RacingStore {
        inner: InMemoryTagStore,
        stale_read: AtomicBool,
    }

    #[async_trait]
    impl TagStore for RacingStore {
        async fn find_facet(&self, prefix: &str) -> StoreResult<Option<TagFacet>> {
            self.inner.find_facet(prefix).await
        }

        async fn create_facet(&self, prefix: &str) -> StoreResult<TagFacet> {
            self.inner.create_facet(prefix).await
        }

        async fn find_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Option<Tag>> {
            if self.stale_read.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_tag(facet_id, label).await
        }

        async fn create_tag(&self, facet_id: Uuid, label: &str) -> StoreResult<Tag> {
            self.inner.create_tag(facet_id, label).await
        }
    }

    #[tokio::test]
    async fn test_conflict_rereads_existing_tag() {
        let inner = InMemoryTagStore::new();
        let facet = inner.create_facet("actor").await.unwrap();
        let existing = inner.create_tag(facet.id, "APT29").await.unwrap();
        let store = RacingStore {
            inner,
            stale_read: AtomicBool::new(true),
        };

        let tags = plain_resolver()
            .resolve_labels(&["actor:APT29"], &mut ResolutionCache::new(), &store)
            .await;
        assert_eq!(tags, vec![existing]);
        assert_eq!(store.inner.tag_creates(), 1);
    }
}
