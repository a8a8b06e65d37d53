// file: src/parser/normalizer.rs
// description: refanging of analyst-obfuscated indicators
// reference: common defang conventions ([.], (.), hxxp, DOT)

/// Dot obfuscations replaced by a plain `.`. Longer forms first.
const DOT_DEFANGS: [&str; 7] = ["[DOT]", "[dot]", "(DOT)", "(dot)", " DOT ", "[.]", "(.)"];

/// Full stops and middle dots that show up when reports pass through CJK
/// tooling.
const WIDE_DOTS: [char; 3] = ['\u{30FB}', '\u{3002}', '\u{FF0E}'];

/// Replaces bracketed/parenthesized/spelled-out dots with `.`.
pub fn refang_dots(s: &str) -> String {
    DOT_DEFANGS
        .iter()
        .fold(s.to_string(), |acc, defang| acc.replace(defang, "."))
}

/// `refang_dots` plus removal of stray parentheses and whitespace, commas
/// turned into dots and wide dots folded to ASCII.
pub fn normalize_common(s: &str) -> String {
    refang_dots(s)
        .chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
        .map(|c| if c == ',' || WIDE_DOTS.contains(&c) { '.' } else { c })
        .collect()
}

/// Drops literal square brackets left behind by partial defangs such as
/// `1.2.3[.4`.
pub fn strip_brackets(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '[' | ']')).collect()
}
