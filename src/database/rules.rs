// file: src/database/rules.rs
// description: read-only source of persisted rewrite-rule sets
// reference: rule sets live in the tagging section of the configuration

use crate::config::TaggingConfig;
use crate::error::Result;
use crate::models::RewriteRuleSet;
use async_trait::async_trait;

#[async_trait]
pub trait RewriteRuleSource: Send + Sync {
    async fn rule_sets(&self) -> Result<Vec<RewriteRuleSet>>;
}

/// Serves the rule sets declared in the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigRuleSource {
    rule_sets: Vec<RewriteRuleSet>,
}

impl ConfigRuleSource {
    pub fn new(rule_sets: Vec<RewriteRuleSet>) -> Self {
        Self { rule_sets }
    }

    pub fn from_config(config: &TaggingConfig) -> Self {
        Self::new(config.rule_sets.clone())
    }
}

#[async_trait]
impl RewriteRuleSource for ConfigRuleSource {
    async fn rule_sets(&self) -> Result<Vec<RewriteRuleSet>> {
        Ok(self.rule_sets.clone())
    }
}
