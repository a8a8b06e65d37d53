// file: src/extractor/hash.rs
// description: md5/sha1/sha256/sha512 digest extraction
// reference: hex digest lengths 32/40/64/128

use crate::extractor::patterns::HEX_RUN;
use crate::extractor::{Extractor, ExtractorKind, dedup};
use crate::models::{Observable, ObservableType};

/// Matches whole hex runs only, so a 32-char window inside a longer blob is
/// never reported as an MD5.
pub struct HashExtractor;

impl HashExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HashExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for HashExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Hash
    }

    fn extract<'a>(&'a self, content: &'a str) -> Box<dyn Iterator<Item = Observable> + 'a> {
        let hashes = HEX_RUN.find_iter(content).filter_map(|m| {
            let kind = ObservableType::hash_for_len(m.len())?;
            Some(Observable::new(kind, m.as_str().to_ascii_lowercase()))
        });
        Box::new(dedup(hashes))
    }
}
