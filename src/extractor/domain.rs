// file: src/extractor/domain.rs
// description: fully qualified domain name extraction validated against the tld list
// reference: label rules from rfc 1035; tld membership from the bundled reference list

use crate::extractor::patterns::DOMAIN;
use crate::extractor::tld::TldSet;
use crate::extractor::{Extractor, ExtractorKind, dedup, next_char, prev_char};
use crate::models::{Observable, ObservableType};
use crate::parser::refang_dots;
use tracing::debug;

/// Characters that may directly follow a domain. Anything else (`/`, `:`,
/// `-`, letters, digits) means the match is a fragment of something longer.
const TRAILING_PUNCTUATION: [char; 10] = [',', ';', '.', '!', '?', ')', ']', '"', '\'', '>'];

pub struct DomainExtractor {
    tlds: TldSet,
}

impl DomainExtractor {
    pub fn new() -> Self {
        Self::with_tlds(TldSet::bundled())
    }

    pub fn with_tlds(tlds: TldSet) -> Self {
        Self { tlds }
    }

    /// Refangs, lower-cases and checks the top-level label.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        let domain = refang_dots(raw)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let tld = domain.rsplit('.').next()?;
        if !self.tlds.contains(tld) {
            debug!("Dropping domain candidate {:?}: unknown TLD", raw);
            return None;
        }
        Some(domain)
    }
}

impl Default for DomainExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches preceded by a path-like delimiter belong to a URL.
fn follows_path_delimiter(content: &str, start: usize) -> bool {
    matches!(prev_char(content, start), Some('/' | '\\' | '@' | '%'))
        || content[..start]
            .get(start.saturating_sub(3)..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case("%2f"))
}

/// `foo_evil.com` must not yield `evil.com`.
fn follows_word_char(content: &str, start: usize) -> bool {
    prev_char(content, start).is_some_and(|c| c == '_' || c.is_alphanumeric())
}

fn is_bounded(content: &str, end: usize) -> bool {
    match next_char(content, end) {
        None => true,
        Some(c) => c.is_whitespace() || TRAILING_PUNCTUATION.contains(&c),
    }
}

impl Extractor for DomainExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Domain
    }

    fn extract<'a>(&'a self, content: &'a str) -> Box<dyn Iterator<Item = Observable> + 'a> {
        let domains = DOMAIN
            .find_iter(content)
            .filter(move |m| is_bounded(content, m.end()))
            .filter(move |m| !follows_path_delimiter(content, m.start()))
            .filter(move |m| !follows_word_char(content, m.start()))
            .filter_map(move |m| self.canonicalize(m.as_str()))
            .map(|domain| Observable::new(ObservableType::Fqdn, domain));
        Box::new(dedup(domains))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(text: &str) -> Vec<String> {
        DomainExtractor::new().extract(text).map(|o| o.value).collect()
    }

    #[test]
    fn test_plain_and_defanged() {
        assert_eq!(values("Visit malicious.com for more"), vec!["malicious.com"]);
        assert_eq!(values("c2: update[.]Evil-Corp[.]ru"), vec!["update.evil-corp.ru"]);
        assert_eq!(values("evil(dot)net\n"), vec!["evil.net"]);
        assert_eq!(values("evil DOT org"), vec!["evil.org"]);
    }

    #[test]
    fn test_unknown_tld_is_dropped() {
        assert!(values("dropped mboard.dll on disk").is_empty());
        assert!(values("run payload.exe now").is_empty());
        assert!(values("host.notarealtld ").is_empty());
    }

    #[test]
    fn test_url_fragments_are_left_alone() {
        assert!(values("hxxp://evil[.]com/path").is_empty());
        assert!(values("mail admin@evil.com today").is_empty());
        assert!(values("redirect=%2Fevil.com ok").is_empty());
        assert!(values(r"share \\fileserver.corp.com ").is_empty());
    }

    #[test]
    fn test_requires_boundary() {
        assert!(values("evil.com/path").is_empty());
        assert!(values("evil.com:8080").is_empty());
        assert_eq!(values("(see evil.com)."), vec!["evil.com"]);
    }

    #[test]
    fn test_rejects_fragment_of_longer_token() {
        assert!(values("dropper foo_evil.com seen").is_empty());
        assert!(values("ünicodeevil[.]com").is_empty());
        assert_eq!(values("(evil.com) and \"bad.net\""), vec!["evil.com", "bad.net"]);
    }

    #[test]
    fn test_ip_addresses_are_not_domains() {
        assert!(values("1.2.3.4 and 1[.]2[.]3[.]4").is_empty());
    }

    #[test]
    fn test_custom_tld_set() {
        let extractor = DomainExtractor::with_tlds(TldSet::parse("LOCAL"));
        let found: Vec<_> = extractor.extract("printer.local\nevil.com").map(|o| o.value).collect();
        assert_eq!(found, vec!["printer.local"]);
    }
}
