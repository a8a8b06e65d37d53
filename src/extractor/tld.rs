// file: src/extractor/tld.rs
// description: reference set of valid top-level domains
// reference: public suffix list, reduced to its top-level labels

use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

const BUNDLED_TLDS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/tlds.txt"));

/// Upper-cased TLD labels. Read-only once built.
#[derive(Debug, Clone)]
pub struct TldSet {
    tlds: HashSet<String>,
}

impl TldSet {
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_TLDS)
    }

    /// One TLD per line; blank lines and `#` comments are ignored.
    pub fn parse(list: &str) -> Self {
        let tlds = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.trim_start_matches('.').to_uppercase())
            .collect();
        Self { tlds }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let list = fs::read_to_string(path).map_err(|source| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&list);
        if set.is_empty() {
            return Err(PipelineError::Config(format!(
                "TLD list {} is empty",
                path.display()
            )));
        }
        info!("Loaded {} TLDs from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tlds.contains(&label.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.tlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tlds.is_empty()
    }
}

impl Default for TldSet {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_list() {
        let tlds = TldSet::bundled();
        assert!(tlds.len() > 1000);
        assert!(tlds.contains("com"));
        assert!(tlds.contains("ORG"));
        assert!(tlds.contains("ru"));
        assert!(!tlds.contains("dll"));
        assert!(!tlds.contains("exe"));
    }

    #[test]
    fn test_parse_skips_comments() {
        let tlds = TldSet::parse("# header\n\ncom\n.net\n");
        assert_eq!(tlds.len(), 2);
        assert!(tlds.contains("NET"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "COM\nLOCAL").unwrap();
        let tlds = TldSet::from_file(file.path()).unwrap();
        assert!(tlds.contains("local"));
    }

    #[test]
    fn test_from_empty_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(TldSet::from_file(file.path()).is_err());
    }
}
