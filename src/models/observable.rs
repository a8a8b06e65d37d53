// file: src/models/observable.rs
// description: typed indicator values produced by the extractors
// reference: stix cyber-observable types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Annotation marking addresses in private, loopback or link-local ranges.
pub const TAG_PRIVATE_NETWORK: &str = "net.priv";

/// Annotation telling downstream workflows to ignore a whitelisted value.
pub const TAG_WORKFLOW_IGNORE: &str = "_di.workflow.ignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservableType {
    Ipv4,
    Fqdn,
    Url,
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ObservableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservableType::Ipv4 => "ipv4",
            ObservableType::Fqdn => "fqdn",
            ObservableType::Url => "url",
            ObservableType::Md5 => "md5",
            ObservableType::Sha1 => "sha1",
            ObservableType::Sha256 => "sha256",
            ObservableType::Sha512 => "sha512",
        }
    }

    /// Classifies a hex digest by its length.
    pub fn hash_for_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(ObservableType::Md5),
            40 => Some(ObservableType::Sha1),
            64 => Some(ObservableType::Sha256),
            128 => Some(ObservableType::Sha512),
            _ => None,
        }
    }

    pub fn is_hash(&self) -> bool {
        matches!(
            self,
            ObservableType::Md5 | ObservableType::Sha1 | ObservableType::Sha256 | ObservableType::Sha512
        )
    }
}

impl fmt::Display for ObservableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed indicator. Equality and hashing use `(kind, value)` only; the
/// annotation tags ride along and are merged by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observable {
    #[serde(rename = "type")]
    pub kind: ObservableType,
    pub value: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Observable {
    pub fn new(kind: ObservableType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Hash observables expose their `(algorithm, digest)` pair.
    pub fn hash_tuple(&self) -> Option<(ObservableType, &str)> {
        self.kind.is_hash().then_some((self.kind, self.value.as_str()))
    }
}

impl PartialEq for Observable {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl Eq for Observable {}

impl Hash for Observable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}
