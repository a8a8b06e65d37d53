// file: src/extractor/aggregator.rs
// description: merges observables across extractor runs and document files
// reference: value+type identity, first-seen order

use crate::models::{Observable, ObservableType};
use std::collections::{BTreeMap, HashMap};

/// Facet prefix used for observable-type summary labels.
pub const OBSERVABLE_FACET: &str = "observable";

#[derive(Debug, Clone, Default)]
pub struct ObservableAggregator {
    observables: Vec<Observable>,
    index: HashMap<(ObservableType, String), usize>,
}

impl ObservableAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observable, merging its tags into an existing entry with the
    /// same identity. Returns `true` when the observable was new.
    pub fn add(&mut self, observable: Observable) -> bool {
        let key = (observable.kind, observable.value.clone());
        match self.index.get(&key) {
            Some(&pos) => {
                self.observables[pos].tags.extend(observable.tags);
                false
            }
            None => {
                self.index.insert(key, self.observables.len());
                self.observables.push(observable);
                true
            }
        }
    }

    /// Returns how many previously unseen observables were added.
    pub fn extend<I>(&mut self, observables: I) -> usize
    where
        I: IntoIterator<Item = Observable>,
    {
        observables
            .into_iter()
            .map(|o| self.add(o))
            .filter(|added| *added)
            .count()
    }

    pub fn merge(&mut self, other: ObservableAggregator) -> usize {
        self.extend(other.observables)
    }

    pub fn len(&self) -> usize {
        self.observables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    pub fn observables(&self) -> &[Observable] {
        &self.observables
    }

    pub fn into_observables(self) -> Vec<Observable> {
        self.observables
    }

    pub fn counts(&self) -> BTreeMap<ObservableType, usize> {
        let mut counts = BTreeMap::new();
        for observable in &self.observables {
            *counts.entry(observable.kind).or_insert(0) += 1;
        }
        counts
    }

    /// One `observable:<type>` label per type present.
    pub fn summary_labels(&self) -> Vec<String> {
        self.counts()
            .keys()
            .map(|kind| format!("{}:{}", OBSERVABLE_FACET, kind))
            .collect()
    }
}

impl FromIterator<Observable> for ObservableAggregator {
    fn from_iter<I: IntoIterator<Item = Observable>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TAG_PRIVATE_NETWORK;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedup_by_type_and_value() {
        let mut agg = ObservableAggregator::new();
        assert!(agg.add(Observable::new(ObservableType::Ipv4, "1.2.3.4")));
        assert!(!agg.add(Observable::new(ObservableType::Ipv4, "1.2.3.4")));
        assert!(agg.add(Observable::new(ObservableType::Fqdn, "1.2.3.4")));
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn test_tags_are_merged() {
        let mut agg = ObservableAggregator::new();
        agg.add(Observable::new(ObservableType::Ipv4, "10.0.0.1"));
        agg.add(Observable::new(ObservableType::Ipv4, "10.0.0.1").with_tag(TAG_PRIVATE_NETWORK));
        assert!(agg.observables()[0].has_tag(TAG_PRIVATE_NETWORK));
    }

    #[test]
    fn test_merge_across_files_keeps_order() {
        let first: ObservableAggregator = vec![
            Observable::new(ObservableType::Fqdn, "a.com"),
            Observable::new(ObservableType::Fqdn, "b.com"),
        ]
        .into_iter()
        .collect();
        let second: ObservableAggregator = vec![
            Observable::new(ObservableType::Fqdn, "b.com"),
            Observable::new(ObservableType::Url, "http://c.com/"),
        ]
        .into_iter()
        .collect();

        let mut doc = first;
        assert_eq!(doc.merge(second), 1);
        let values: Vec<_> = doc.observables().iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["a.com", "b.com", "http://c.com/"]);
    }

    #[test]
    fn test_counts_and_summary_labels() {
        let agg: ObservableAggregator = vec![
            Observable::new(ObservableType::Url, "http://c.com/"),
            Observable::new(ObservableType::Ipv4, "1.2.3.4"),
            Observable::new(ObservableType::Ipv4, "5.6.7.8"),
        ]
        .into_iter()
        .collect();

        assert_eq!(agg.counts().get(&ObservableType::Ipv4), Some(&2));
        assert_eq!(agg.summary_labels(), vec!["observable:ipv4", "observable:url"]);
    }
}
