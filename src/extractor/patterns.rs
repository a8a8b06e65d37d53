// file: src/extractor/patterns.rs
// description: compiled regex patterns for observable extraction and auto-tagging
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

/// One dotted-quad octet, 0-255, no leading zeros.
const OCTET: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])";

/// Dot separators between octets, including half-defanged forms like `[.`.
const IP_SEPARATOR: &str =
    r"(?:\[\.\]|\(\.\)|\[dot\]|\(dot\)|\[DOT\]|\(DOT\)|\[\.|\.\]|\(\.|\.\)|\.)";

/// Dot separators between domain labels (used under `(?i)`).
const LABEL_SEPARATOR: &str = r"(?:\[\.\]|\(\.\)|\[dot\]|\(dot\)|(?-i:\s+DOT\s+)|\.)";

/// Separators that only count as defanged when at least one label uses them.
const BRACKET_SEPARATOR: &str = r"(?:\[\.\]|\[dot\]|\(\.\)|\(dot\))";

/// Scheme separators, including `[://]`, `:\\`, `:__` and bare `__`.
const SCHEME_SEPARATOR: &str = r"(?:\[://\]|\[:\]//|://|:\\\\|:\\|:__|__)";

lazy_static! {
    // File hashes: maximal hex runs, length checked by the extractor
    pub static ref HEX_RUN: Regex = Regex::new(
        r"[0-9a-fA-F]{32,}"
    ).expect("HEX_RUN regex is valid");

    // Network indicators
    pub static ref IPV4: Regex = Regex::new(&format!(
        "{o}{s}{o}{s}{o}{s}{o}",
        o = OCTET,
        s = IP_SEPARATOR
    )).expect("IPV4 regex is valid");

    pub static ref DOMAIN: Regex = Regex::new(&format!(
        r"(?i)(?:[a-z0-9](?:[a-z0-9-]{{0,61}}[a-z0-9])?{sep})+[a-z]{{2,63}}",
        sep = LABEL_SEPARATOR
    )).expect("DOMAIN regex is valid");

    pub static ref URL_GENERIC: Regex = Regex::new(&format!(
        r#"(?i)\b(?:(?:hxxps?|https?|fxps?|ftxs?|ftps?){sep}|[a-z][a-z0-9+.\-]{{1,15}}(?:\[://\]|://))[^\s<>"']+"#,
        sep = SCHEME_SEPARATOR
    )).expect("URL_GENERIC regex is valid");

    pub static ref URL_BRACKETED: Regex = Regex::new(&format!(
        r#"(?i)\b[a-z0-9\-]+(?:{any}[a-z0-9\-]+)*{bracket}[a-z0-9\-]+(?:{any}[a-z0-9\-]+)*(?::[0-9]{{1,5}})?/[^\s<>"']*"#,
        any = r"(?:\[\.\]|\[dot\]|\(\.\)|\(dot\)|\.)",
        bracket = BRACKET_SEPARATOR
    )).expect("URL_BRACKETED regex is valid");

    pub static ref URL_BACKSLASHED: Regex = Regex::new(
        r#"(?i)\b[a-z0-9\-]+(?:\\?\.[a-z0-9\-]+)*\\\.[a-z0-9\-]+(?:\\?\.[a-z0-9\-]+)*(?::[0-9]{1,5})?/[^\s<>"']*"#
    ).expect("URL_BACKSLASHED regex is valid");

    // URL repair
    pub static ref URL_SCHEME_DEFANG: Regex = Regex::new(&format!(
        r"^([a-zA-Z][a-zA-Z0-9+.\-]{{0,15}}){sep}",
        sep = SCHEME_SEPARATOR
    )).expect("URL_SCHEME_DEFANG regex is valid");

    pub static ref ESCAPED_PUNCT: Regex = Regex::new(
        r"\\([[:punct:]])"
    ).expect("ESCAPED_PUNCT regex is valid");

    // Auto-tagging
    pub static ref CVE_ID: Regex = Regex::new(
        r"(?i)\bCVE-[0-9]{4}-[0-9]{4,7}\b"
    ).expect("CVE_ID regex is valid");

    pub static ref TLP_MARKING: Regex = Regex::new(
        r"(?i)\btlp[:/_\s-]+(red|green|white|clear|amber(?:-strict)?)\b"
    ).expect("TLP_MARKING regex is valid");

    pub static ref ATTACK_TECHNIQUE: Regex = Regex::new(
        r"\bT[0-9]{4}(?:\.[0-9]{3})?\b"
    ).expect("ATTACK_TECHNIQUE regex is valid");

    pub static ref ACTOR_NAME: Regex = Regex::new(
        r"(?i)\b(apt|ta)[ -]*([0-9]+)\b"
    ).expect("ACTOR_NAME regex is valid");
}
