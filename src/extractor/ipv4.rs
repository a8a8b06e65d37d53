// file: src/extractor/ipv4.rs
// description: defang-tolerant dotted-quad extraction
// reference: 1.2.3[.]4, 1[.]2(.)3.4, 1.2.3[.4

use crate::extractor::patterns::IPV4;
use crate::extractor::{Extractor, ExtractorKind, dedup, next_char, prev_char};
use crate::models::{Observable, ObservableType};
use crate::parser::{normalize_common, strip_brackets};
use std::net::Ipv4Addr;
use tracing::debug;

pub struct Ipv4Extractor;

impl Ipv4Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Refangs a raw match into a canonical dotted quad.
    pub fn canonicalize(raw: &str) -> Option<Ipv4Addr> {
        let cleaned = strip_brackets(&normalize_common(raw));
        match cleaned.parse::<Ipv4Addr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                debug!("Dropping IPv4 candidate {:?}", raw);
                None
            }
        }
    }
}

impl Default for Ipv4Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Version strings and longer numeric runs (`1.2.3.4.5`, `11.2.3.4` inside
/// `311.2.3.4`) must not yield an address.
fn is_embedded(content: &str, start: usize, end: usize) -> bool {
    let before = prev_char(content, start);
    let after = next_char(content, end);

    let digit_before = before.is_some_and(|c| c.is_ascii_digit())
        || (before == Some('.') && prev_char(content, start - 1).is_some_and(|c| c.is_ascii_digit()));
    let digit_after = after.is_some_and(|c| c.is_ascii_digit())
        || (after == Some('.') && next_char(content, end + 1).is_some_and(|c| c.is_ascii_digit()));

    digit_before || digit_after
}

impl Extractor for Ipv4Extractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Ipv4
    }

    fn extract<'a>(&'a self, content: &'a str) -> Box<dyn Iterator<Item = Observable> + 'a> {
        let addresses = IPV4
            .find_iter(content)
            .filter(move |m| !is_embedded(content, m.start(), m.end()))
            .filter_map(|m| Self::canonicalize(m.as_str()))
            .map(|ip| Observable::new(ObservableType::Ipv4, ip.to_string()));
        Box::new(dedup(addresses))
    }
}
