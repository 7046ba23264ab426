//! Provider field extraction: rule sets, dispatch and the orchestrator.

mod orchestrator;
pub mod rules;
pub mod values;

pub use orchestrator::{ArchiveExtractor, ExtractionResult};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractionError;
use crate::models::config::ProvidersConfig;
use crate::models::instagram::InstagramData;
use crate::models::reddit::RedditData;
use crate::parser::SourceFormat;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A rule folds one parsed entry into the provider's record.
pub type Rule<R> = fn(&mut R, &Value) -> Result<()>;

/// Supported export providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Reddit,
    Instagram,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Reddit => "reddit",
            Provider::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reddit" => Ok(Provider::Reddit),
            "instagram" => Ok(Provider::Instagram),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Immutable mapping from canonical entry name to rule for one provider.
pub struct RuleSet<R> {
    provider: Provider,
    format: SourceFormat,
    rules: HashMap<String, Rule<R>>,
}

impl<R> RuleSet<R> {
    pub fn new(provider: Provider, format: SourceFormat) -> Self {
        Self {
            provider,
            format,
            rules: HashMap::new(),
        }
    }

    /// Register the rule for an entry name, replacing any previous one.
    pub fn with_rule(mut self, file_name: impl Into<String>, rule: Rule<R>) -> Self {
        self.rules.insert(file_name.into(), rule);
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Source format shared by every entry of this provider.
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Rule registered for an exact basename.
    pub fn rule_for(&self, file_name: &str) -> Option<Rule<R>> {
        self.rules.get(file_name).copied()
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.rules.contains_key(file_name)
    }

    /// Registered entry names, sorted.
    pub fn file_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply the matching rule, if any. Returns whether a rule ran.
    pub fn apply(&self, record: &mut R, file_name: &str, content: &Value) -> Result<bool> {
        match self.rule_for(file_name) {
            Some(rule) => rule(record, content).map(|()| true),
            None => Ok(false),
        }
    }
}

impl<R> fmt::Debug for RuleSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("provider", &self.provider)
            .field("format", &self.format)
            .field("files", &self.file_names())
            .finish()
    }
}

/// Rule sets for every provider, built once from configuration.
#[derive(Debug)]
pub struct Providers {
    pub reddit: RuleSet<RedditData>,
    pub instagram: RuleSet<InstagramData>,
}

impl Providers {
    pub fn from_config(config: &ProvidersConfig) -> Self {
        Self {
            reddit: rules::reddit::rule_set(&config.reddit),
            instagram: rules::instagram::rule_set(&config.instagram),
        }
    }

    /// Registered entry names of a provider.
    pub fn file_names(&self, provider: Provider) -> Vec<&str> {
        match provider {
            Provider::Reddit => self.reddit.file_names(),
            Provider::Instagram => self.instagram.file_names(),
        }
    }

    /// Whether a provider has a rule for an entry name.
    pub fn matches(&self, provider: Provider, file_name: &str) -> bool {
        match provider {
            Provider::Reddit => self.reddit.matches(file_name),
            Provider::Instagram => self.instagram.matches(file_name),
        }
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self::from_config(&ProvidersConfig::default())
    }
}

/// A finalized record of any provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "data", rename_all = "lowercase")]
pub enum NormalizedRecord {
    Reddit(RedditData),
    Instagram(InstagramData),
}

impl NormalizedRecord {
    pub fn provider(&self) -> Provider {
        match self {
            NormalizedRecord::Reddit(_) => Provider::Reddit,
            NormalizedRecord::Instagram(_) => Provider::Instagram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn count_rule(count: &mut usize, content: &Value) -> Result<()> {
        *count += values::rows(content).len();
        Ok(())
    }

    #[test]
    fn test_rule_set_dispatch_by_exact_name() {
        let rules = RuleSet::new(Provider::Reddit, SourceFormat::Tabular)
            .with_rule("comments.csv", count_rule as Rule<usize>);
        let mut count = 0;

        assert!(rules.apply(&mut count, "comments.csv", &json!([{}, {}])).unwrap());
        assert!(!rules.apply(&mut count, "Comments.csv", &json!([{}])).unwrap());
        assert!(!rules.apply(&mut count, "comments.json", &json!([{}])).unwrap());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_providers_from_config() {
        let mut config = ProvidersConfig::default();
        config.reddit.votes = "votes_v2.csv".to_string();

        let providers = Providers::from_config(&config);

        assert!(providers.matches(Provider::Reddit, "votes_v2.csv"));
        assert!(!providers.matches(Provider::Reddit, "post_votes.csv"));
        assert_eq!(providers.file_names(Provider::Reddit).len(), 7);
        assert_eq!(providers.file_names(Provider::Instagram).len(), 9);
        assert_eq!(providers.instagram.format(), SourceFormat::Hierarchical);
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Reddit".parse::<Provider>(), Ok(Provider::Reddit));
        assert_eq!(" instagram ".parse::<Provider>(), Ok(Provider::Instagram));
        assert!("myspace".parse::<Provider>().is_err());
        assert_eq!(Provider::Instagram.to_string(), "instagram");
    }

    #[test]
    fn test_normalized_record_is_tagged() {
        let record = NormalizedRecord::Reddit(RedditData::default());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["provider"], "reddit");
        assert_eq!(value["data"]["subreddits"], 0);
        assert_eq!(record.provider(), Provider::Reddit);
    }
}
