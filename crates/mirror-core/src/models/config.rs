//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the mirror pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Archive reading configuration.
    pub archive: ArchiveConfig,

    /// Parsing and rule dispatch configuration.
    pub extraction: ExtractionConfig,

    /// Canonical entry filenames per provider.
    pub providers: ProvidersConfig,

    /// Local storage configuration.
    pub storage: StorageConfig,
}

/// Archive reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Entry extensions (with leading dot) that are decoded; everything else is ignored.
    pub supported_extensions: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            supported_extensions: vec![".csv".to_string(), ".json".to_string()],
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Skip entries that fail to parse instead of failing the whole run.
    pub skip_malformed_entries: bool,

    /// Undo UTF-8-read-as-Latin-1 double encoding in parsed strings.
    pub repair_double_encoding: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            skip_malformed_entries: false,
            repair_double_encoding: true,
        }
    }
}

/// Canonical filenames for every provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub reddit: RedditFiles,
    pub instagram: InstagramFiles,
}

/// Reddit export entry names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditFiles {
    pub gender: String,
    pub ip_logs: String,
    pub comments: String,
    pub posts: String,
    pub votes: String,
    pub messages: String,
    pub subreddits: String,
}

impl Default for RedditFiles {
    fn default() -> Self {
        Self {
            gender: "account_gender.csv".to_string(),
            ip_logs: "ip_logs.csv".to_string(),
            comments: "comments.csv".to_string(),
            posts: "posts.csv".to_string(),
            votes: "post_votes.csv".to_string(),
            messages: "messages.csv".to_string(),
            subreddits: "subscribed_subreddits.csv".to_string(),
        }
    }
}

/// Instagram export entry names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstagramFiles {
    pub comments: String,
    pub messages: String,
    pub posts: String,
    pub likes: String,
    pub followers: String,
    pub followings: String,
    pub ads_interests: String,
    pub your_topics: String,
    pub stories: String,
}

impl Default for InstagramFiles {
    fn default() -> Self {
        Self {
            comments: "post_comments.json".to_string(),
            messages: "message_1.json".to_string(),
            posts: "posts_1.json".to_string(),
            likes: "liked_posts.json".to_string(),
            followers: "followers.json".to_string(),
            followings: "following.json".to_string(),
            ads_interests: "ads_interests.json".to_string(),
            your_topics: "your_topics.json".to_string(),
            stories: "stories.json".to_string(),
        }
    }
}

/// Local storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved records. Callers pick a platform default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl MirrorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
