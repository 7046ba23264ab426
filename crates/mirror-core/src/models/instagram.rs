//! Normalized record for Instagram data exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facts extracted from an Instagram export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramData {
    /// Dated user contributions.
    pub contributions: InstagramContributions,

    /// Follower graph.
    pub relationships: Relationships,

    /// Inferred and self-selected interests.
    pub interests: Interests,
}

/// Points in time at which the account contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramContributions {
    pub comments: Vec<DateTime<Utc>>,
    pub messages: Vec<InstagramMessage>,
    pub posts: Vec<DateTime<Utc>>,
    pub likes: Vec<DateTime<Utc>>,
    pub stories: Vec<DateTime<Utc>>,
}

/// A direct message kept from a one-to-one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramMessage {
    /// The conversation partner (first listed participant).
    pub participant: String,
    /// Display name of the author.
    pub sender: String,
    pub date: DateTime<Utc>,
}

/// Accounts following and followed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    pub followers: Vec<String>,
    pub followings: Vec<String>,
}

/// Interest tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interests {
    /// Advertising interests inferred by the provider.
    pub ads: Vec<String>,
    pub topics: Vec<String>,
}
