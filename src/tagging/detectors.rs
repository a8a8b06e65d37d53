// file: src/tagging/detectors.rs
// description: auto-tag detectors producing "prefix:label" candidates from extracted text
// reference: cve ids, tlp markings, mitre att&ck technique ids, apt/ta actor names

use crate::extractor::patterns::{ACTOR_NAME, ATTACK_TECHNIQUE, CVE_ID, TLP_MARKING};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    Cve,
    Tlp,
    Technique,
    Actor,
}

impl Detector {
    pub const ALL: [Detector; 4] = [
        Detector::Cve,
        Detector::Tlp,
        Detector::Technique,
        Detector::Actor,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            Detector::Cve => "vulnerability",
            Detector::Tlp => "TLP",
            Detector::Technique => "technique",
            Detector::Actor => "actor",
        }
    }

    /// Labels found by this detector, in order of first appearance.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let bodies: Vec<String> = match self {
            Detector::Cve => CVE_ID
                .find_iter(text)
                .map(|m| m.as_str().to_uppercase())
                .collect(),
            Detector::Tlp => TLP_MARKING
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase())
                .collect(),
            Detector::Technique => ATTACK_TECHNIQUE
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
            Detector::Actor => ACTOR_NAME
                .captures_iter(text)
                .map(|c| format!("{}{}", c[1].to_uppercase(), &c[2]))
                .collect(),
        };

        let mut seen = HashSet::new();
        bodies
            .into_iter()
            .filter(|body| seen.insert(body.clone()))
            .map(|body| format!("{}:{}", self.prefix(), body))
            .collect()
    }
}

/// Runs every detector over `text`.
pub fn detect_labels(text: &str) -> Vec<String> {
    Detector::ALL
        .iter()
        .flat_map(|detector| detector.detect(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cve() {
        assert_eq!(
            Detector::Cve.detect("Exploits cve-2021-44228 and CVE-2021-44228."),
            vec!["vulnerability:CVE-2021-44228"]
        );
    }

    #[test]
    fn test_tlp() {
        assert_eq!(Detector::Tlp.detect("TLP:AMBER"), vec!["TLP:amber"]);
        assert_eq!(Detector::Tlp.detect("tlp - amber-strict"), vec!["TLP:amber-strict"]);
        assert!(Detector::Tlp.detect("TLP").is_empty());
    }

    #[test]
    fn test_technique() {
        assert_eq!(
            Detector::Technique.detect("T1059.001 then T1566"),
            vec!["technique:T1059.001", "technique:T1566"]
        );
    }

    #[test]
    fn test_actor_normalization() {
        assert_eq!(
            Detector::Actor.detect("apt 29, APT-29 and TA505"),
            vec!["actor:APT29", "actor:TA505"]
        );
    }

    #[test]
    fn test_detect_labels_order() {
        let text = "TLP:GREEN report on APT28 using T1190 against CVE-2023-1234";
        assert_eq!(
            detect_labels(text),
            vec![
                "vulnerability:CVE-2023-1234",
                "TLP:green",
                "technique:T1190",
                "actor:APT28"
            ]
        );
    }
}
