// file: src/extractor/mod.rs
// description: observable extraction module exports and the extractor registry
// reference: internal module structure

pub mod aggregator;
pub mod annotate;
pub mod domain;
pub mod hash;
pub mod ipv4;
pub mod patterns;
pub mod tld;
pub mod url;

pub use aggregator::ObservableAggregator;
pub use annotate::{Annotator, PrivateNetworkAnnotator, WhitelistAnnotator};
pub use domain::DomainExtractor;
pub use hash::HashExtractor;
pub use ipv4::Ipv4Extractor;
pub use tld::TldSet;
pub use url::{UrlExtractor, normalize_url};

use crate::models::Observable;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    Hash,
    Ipv4,
    Domain,
    Url,
}

impl ExtractorKind {
    pub const ALL: [ExtractorKind; 4] = [
        ExtractorKind::Hash,
        ExtractorKind::Ipv4,
        ExtractorKind::Domain,
        ExtractorKind::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::Hash => "hash",
            ExtractorKind::Ipv4 => "ipv4",
            ExtractorKind::Domain => "domain",
            ExtractorKind::Url => "url",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stateless scanner. Every call to `extract` is a fresh scan; nothing
/// is retained between calls.
pub trait Extractor: Send + Sync {
    fn kind(&self) -> ExtractorKind;

    fn extract<'a>(&'a self, content: &'a str) -> Box<dyn Iterator<Item = Observable> + 'a>;
}

/// The four extractors, built once at startup.
pub struct ExtractorSet {
    hash: HashExtractor,
    ipv4: Ipv4Extractor,
    domain: DomainExtractor,
    url: UrlExtractor,
}

impl ExtractorSet {
    pub fn new() -> Self {
        Self::with_tlds(TldSet::bundled())
    }

    pub fn with_tlds(tlds: TldSet) -> Self {
        Self {
            hash: HashExtractor::new(),
            ipv4: Ipv4Extractor::new(),
            domain: DomainExtractor::with_tlds(tlds),
            url: UrlExtractor::new(),
        }
    }

    pub fn get(&self, kind: ExtractorKind) -> &dyn Extractor {
        match kind {
            ExtractorKind::Hash => &self.hash,
            ExtractorKind::Ipv4 => &self.ipv4,
            ExtractorKind::Domain => &self.domain,
            ExtractorKind::Url => &self.url,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Extractor> {
        ExtractorKind::ALL.into_iter().map(|kind| self.get(kind))
    }

    /// Runs every extractor over `content`, one after another.
    pub fn scan<'a>(&'a self, content: &'a str) -> impl Iterator<Item = Observable> + 'a {
        self.iter().flat_map(move |extractor| extractor.extract(content))
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops repeats within a single scan.
pub(crate) fn dedup<I>(observables: I) -> impl Iterator<Item = Observable>
where
    I: Iterator<Item = Observable>,
{
    let mut seen = HashSet::new();
    observables.filter(move |o| seen.insert(o.clone()))
}

pub(crate) fn prev_char(text: &str, pos: usize) -> Option<char> {
    text.get(..pos)?.chars().next_back()
}

pub(crate) fn next_char(text: &str, pos: usize) -> Option<char> {
    text.get(pos..)?.chars().next()
}
