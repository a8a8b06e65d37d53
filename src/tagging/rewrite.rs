// file: src/tagging/rewrite.rs
// description: ordered label rewrite rules compiled once per resolver run
// reference: https://docs.rs/regex (replace_all with $n group expansion)

use crate::error::PipelineError;
use crate::models::RewriteRuleSet;
use regex::Regex;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// Every rule of every set, flattened into evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RewriteChain {
    rules: Vec<CompiledRule>,
}

impl RewriteChain {
    /// Sets are ordered by position, then rules within each set. A rule whose
    /// pattern does not compile is logged and left out of the chain.
    pub fn compile(rule_sets: &[RewriteRuleSet]) -> Self {
        let mut sets: Vec<&RewriteRuleSet> = rule_sets.iter().collect();
        sets.sort_by_key(|set| set.position);

        let mut rules = Vec::new();
        for set in sets {
            let mut ordered: Vec<_> = set.rules.iter().collect();
            ordered.sort_by_key(|rule| rule.position);

            for rule in ordered {
                match Regex::new(&rule.search) {
                    Ok(pattern) => rules.push(CompiledRule {
                        pattern,
                        replacement: rule.replacement.clone(),
                    }),
                    Err(e) => {
                        let err = PipelineError::RewriteRule {
                            search: rule.search.clone(),
                            message: e.to_string(),
                        };
                        warn!(rule_set = %set.name, "Skipping rewrite rule: {}", err);
                    }
                }
            }
        }

        debug!("Compiled {} rewrite rules", rules.len());
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs `label` through every rule in order, then splits the result on
    /// commas. Empty segments are dropped.
    pub fn apply(&self, label: &str) -> Vec<String> {
        let rewritten = self.rules.iter().fold(label.to_string(), |current, rule| {
            rule.pattern
                .replace_all(&current, rule.replacement.as_str())
                .into_owned()
        });

        rewritten
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }
}
