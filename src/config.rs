// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::extractor::annotate::DEFAULT_WHITELIST;
use crate::models::RewriteRuleSet;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub tagging: TaggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub parallel_workers: usize,
    pub max_file_size_mb: usize,
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// Applied to every content-extraction and graph-store call made for a file.
    pub collaborator_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    /// Zero disables the limit.
    pub fn max_file_bytes(&self) -> u64 {
        (self.max_file_size_mb as u64) * 1_048_576
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Default for documents and sources that carry no extraction override.
    pub structured_data: bool,
    #[serde(default)]
    pub tld_path: Option<PathBuf>,
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub tag_observable_types: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaggingConfig {
    #[serde(default)]
    pub rule_sets: Vec<RewriteRuleSet>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("THREAT_INGEST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            pipeline: PipelineConfig {
                parallel_workers: 4,
                max_file_size_mb: 25,
                skip_patterns: vec![
                    "*.zip".to_string(),
                    "*.png".to_string(),
                    ".git/".to_string(),
                ],
                collaborator_timeout_secs: 60,
            },
            extraction: ExtractionConfig {
                structured_data: true,
                tld_path: None,
                whitelist: DEFAULT_WHITELIST.iter().map(|d| d.to_string()).collect(),
                tag_observable_types: true,
            },
            tagging: TaggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(PipelineError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.collaborator_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "collaborator_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(entry) = self
            .extraction
            .whitelist
            .iter()
            .find(|entry| entry.trim().is_empty() || entry.contains(['/', ' ', ':']))
        {
            return Err(PipelineError::Config(format!(
                "whitelist entry {:?} is not a domain",
                entry
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.collaborator_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default_config();
        config.pipeline.parallel_workers = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default_config();
        config.pipeline.collaborator_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_url_in_whitelist() {
        let mut config = Config::default_config();
        config.extraction.whitelist.push("https://github.com/".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ingest.toml");
        fs::write(
            &path,
            r#"
[pipeline]
parallel_workers = 2
max_file_size_mb = 5
collaborator_timeout_secs = 10

[extraction]
structured_data = false
whitelist = ["corp.example"]

[[tagging.rule_sets]]
name = "actors"
position = 1

[[tagging.rule_sets.rules]]
search = "^actor:Cozy Bear$"
replacement = "actor:APT29"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.pipeline.parallel_workers, 2);
        assert!(!config.extraction.structured_data);
        assert!(!config.extraction.tag_observable_types);
        assert_eq!(config.tagging.rule_sets.len(), 1);
        assert_eq!(config.tagging.rule_sets[0].rules[0].replacement, "actor:APT29");
        assert_eq!(config.tagging.rule_sets[0].rules[0].position, 0);
    }
}
