// file: src/extractor/url.rs
// description: defanged url extraction and canonicalization
// reference: hxxp/fxp scheme lookalikes, [.] and backslash defangs, https://docs.rs/url

use crate::extractor::patterns::{
    ESCAPED_PUNCT, URL_BACKSLASHED, URL_BRACKETED, URL_GENERIC, URL_SCHEME_DEFANG,
};
use crate::extractor::{Extractor, ExtractorKind, dedup};
use crate::models::{Observable, ObservableType};
use crate::parser::{normalize_common, refang_dots, strip_brackets};
use ::url::Url;
use std::net::Ipv6Addr;
use std::ops::Range;
use tracing::debug;

/// Punctuation that ends a sentence rather than a URL. `]` is deliberately
/// absent: a stray closing bracket stays in the candidate.
const TRAILING_NOISE: [char; 8] = ['.', ',', ';', ':', '!', '?', '\'', '"'];

pub struct UrlExtractor;

impl UrlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for UrlExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Url
    }

    fn extract<'a>(&'a self, content: &'a str) -> Box<dyn Iterator<Item = Observable> + 'a> {
        let generic: Vec<Range<usize>> = URL_GENERIC.find_iter(content).map(|m| m.range()).collect();

        // A scheme-less match inside a generic one is the same URL without its
        // scheme (`hxxps://a[.]b/c` must not also yield `http://a.b/c`). A
        // generic match inside a scheme-less one is an embedded URL, and both
        // are kept.
        let scheme_less = URL_BRACKETED
            .find_iter(content)
            .chain(URL_BACKSLASHED.find_iter(content))
            .map(|m| m.range())
            .filter(|range| !generic.iter().any(|g| covers_start(g, range)))
            .collect::<Vec<_>>();

        let urls = generic
            .into_iter()
            .chain(scheme_less)
            .filter_map(move |range| normalize_url(&content[range]))
            .map(|url| Observable::new(ObservableType::Url, url));
        Box::new(dedup(urls))
    }
}

fn covers_start(generic: &Range<usize>, candidate: &Range<usize>) -> bool {
    generic.start <= candidate.start && candidate.start < generic.end
}

/// Canonicalizes one raw URL candidate. Returns `None` when the repaired
/// string still does not parse. Applying it to its own output is a no-op.
pub fn normalize_url(raw: &str) -> Option<String> {
    // Repair first: `a.]` only becomes a trailing `.` once refanged.
    let refanged = repair_dot_defangs(raw);
    let trimmed = trim_trailing_noise(&refanged);

    // Only a scheme at the very start counts; `://` further in belongs to
    // an embedded URL in the path or query.
    let candidate = if URL_SCHEME_DEFANG.is_match(trimmed) {
        URL_SCHEME_DEFANG.replace(trimmed, "${1}://").into_owned()
    } else {
        format!("http://{}", trimmed)
    };

    let (scheme, rest) = candidate.split_once("://")?;
    let rest = unescape_punctuation(rest);
    let (authority, tail) = rest.split_at(rest.find(['/', '?', '#', '\\']).unwrap_or(rest.len()));
    let authority = normalize_authority(authority)?;

    let repaired = format!("{}://{}{}", canonical_scheme(scheme), authority, tail);
    match Url::parse(&repaired) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Some(url.to_string()),
        Ok(_) => {
            debug!("Dropping URL candidate {:?}: no host", raw);
            None
        }
        Err(e) => {
            debug!("Dropping URL candidate {:?}: {}", raw, e);
            None
        }
    }
}

fn trim_trailing_noise(raw: &str) -> &str {
    let mut s = raw;
    loop {
        let Some(last) = s.chars().next_back() else {
            return s;
        };
        let unbalanced_paren = last == ')' && s.matches('(').count() < s.matches(')').count();
        if TRAILING_NOISE.contains(&last) || unbalanced_paren {
            s = &s[..s.len() - last.len_utf8()];
        } else {
            return s;
        }
    }
}

/// `[.` / `.]` / `[dot` / `dot]` all collapse to `.`.
fn repair_dot_defangs(s: &str) -> String {
    refang_dots(s)
        .replace("[dot", "[.")
        .replace("dot]", ".]")
        .replace("[.]", ".")
        .replace("[.", ".")
        .replace(".]", ".")
}

fn unescape_punctuation(s: &str) -> String {
    let mut out = s.to_string();
    while ESCAPED_PUNCT.is_match(&out) {
        out = ESCAPED_PUNCT.replace_all(&out, "${1}").into_owned();
    }
    out
}

/// Lookalike schemes map back to the real ones; anything unrecognized is
/// treated as http.
fn canonical_scheme(scheme: &str) -> &'static str {
    match scheme.to_ascii_lowercase().as_str() {
        "http" | "hxxp" => "http",
        "https" | "hxxps" => "https",
        "ftp" | "fxp" | "ftx" => "ftp",
        "ftps" | "fxps" | "ftxs" => "ftps",
        _ => "http",
    }
}

fn normalize_authority(authority: &str) -> Option<String> {
    let (userinfo, host_port) = match authority.rsplit_once('@') {
        Some((user, host)) => (format!("{}@", user), host),
        None => (String::new(), authority),
    };

    if let Some(literal) = ipv6_literal(host_port) {
        return Some(format!("{}{}", userinfo, literal));
    }

    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            (host, Some(port))
        }
        _ => (host_port, None),
    };

    let host = strip_brackets(&normalize_common(host));
    if host.is_empty() {
        return None;
    }

    Some(match port {
        Some(port) => format!("{}{}:{}", userinfo, host, port),
        None => format!("{}{}", userinfo, host),
    })
}

/// A bracketed host that parses as IPv6 (optionally followed by `:port`) is
/// returned untouched; stripping its brackets would corrupt it.
fn ipv6_literal(host_port: &str) -> Option<&str> {
    let inner_end = host_port.strip_prefix('[')?.find(']')? + 1;
    let inner = &host_port[1..inner_end];
    inner.parse::<Ipv6Addr>().ok()?;

    let after = &host_port[inner_end + 1..];
    let valid_port = after.is_empty()
        || after
            .strip_prefix(':')
            .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    valid_port.then_some(host_port)
}
