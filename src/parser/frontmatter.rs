// file: src/parser/frontmatter.rs
// description: YAML frontmatter metadata for plain-text and markdown reports
// reference: https://docs.rs/yaml-rust

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use yaml_rust::{Yaml, YamlLoader};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub fields: HashMap<String, String>,
}

pub struct FrontmatterParser;

impl FrontmatterParser {
    pub fn new() -> Self {
        Self
    }

    /// Splits a leading `---` block from the body. Returns `None` when the
    /// text has no frontmatter.
    pub fn extract<'a>(&self, content: &'a str) -> Result<Option<(Frontmatter, &'a str)>> {
        let Some(rest) = content.strip_prefix("---") else {
            return Ok(None);
        };
        let Some(end) = rest.find("\n---") else {
            return Ok(None);
        };

        let yaml_content = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\r', '\n']);

        let docs = YamlLoader::load_from_str(yaml_content).map_err(|e| {
            PipelineError::ContentExtraction {
                file: "frontmatter".to_string(),
                message: format!("YAML parse error: {}", e),
            }
        })?;

        let Some(Yaml::Hash(hash)) = docs.into_iter().next() else {
            return Ok(None);
        };

        let fields = hash
            .into_iter()
            .filter_map(|(key, value)| Some((key.into_string()?, scalar_to_string(value)?)))
            .collect();

        Ok(Some((Frontmatter { fields }, body)))
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_to_string(value: Yaml) -> Option<String> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => Some(s),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontmatter_extraction() {
        let parser = FrontmatterParser::new();
        let content = "---\ntitle: APT29 Campaign\nyear: 2021\ntags: [a, b]\n---\n\nBody text";
        let (frontmatter, body) = parser.extract(content).unwrap().unwrap();

        assert_eq!(frontmatter.fields.get("title").unwrap(), "APT29 Campaign");
        assert_eq!(frontmatter.fields.get("year").unwrap(), "2021");
        assert!(!frontmatter.fields.contains_key("tags"));
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_no_frontmatter() {
        let parser = FrontmatterParser::new();
        assert!(parser.extract("Just text, 1.2.3[.]4").unwrap().is_none());
        assert!(parser.extract("--- unterminated").unwrap().is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let parser = FrontmatterParser::new();
        assert!(parser.extract("---\ntitle: [unclosed\n---\nbody").is_err());
    }
}
