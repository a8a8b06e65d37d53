// file: src/models/tag.rs
// description: tag facets, tags and label rewrite rules
// reference: "prefix:label" tagging convention

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace for tags, e.g. `actor`, `vulnerability`, `TLP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagFacet {
    pub id: Uuid,
    pub prefix: String,
    pub title: String,
}

impl TagFacet {
    /// New facets are titled after their prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            id: Uuid::new_v4(),
            title: prefix.clone(),
            prefix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub facet_id: Uuid,
    pub label: String,
}

impl Tag {
    pub fn new(facet_id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            facet_id,
            label: label.into(),
        }
    }

    /// Labels compare case-insensitively within a facet.
    pub fn lookup_key(facet_id: Uuid, label: &str) -> (Uuid, String) {
        (facet_id, label.to_uppercase())
    }

    pub fn key(&self) -> (Uuid, String) {
        Self::lookup_key(self.facet_id, &self.label)
    }
}

/// A label split into its facet prefix and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef<'a> {
    pub prefix: &'a str,
    pub label: &'a str,
}

impl<'a> LabelRef<'a> {
    /// Splits on the first `:`. Returns `None` unless both halves are non-empty.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (prefix, label) = raw.split_once(':')?;
        let prefix = prefix.trim();
        let label = label.trim();
        if prefix.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self { prefix, label })
    }
}

impl fmt::Display for LabelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    /// Regular expression matched against the whole label string.
    pub search: String,
    /// Replacement text; `$1`-style group references are expanded and a
    /// comma-separated result yields several labels.
    pub replacement: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRuleSet {
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}
