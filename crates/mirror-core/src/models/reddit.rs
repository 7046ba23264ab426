//! Normalized record for Reddit data exports.

use serde::{Deserialize, Serialize};

/// Facts extracted from a Reddit export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditData {
    /// Account gender as reported by the export (empty when absent).
    pub gender: String,

    /// Login IP log rows.
    pub ip_logs: Vec<IpLog>,

    /// User contributions.
    pub contributions: RedditContributions,

    /// Number of subscribed subreddits.
    pub subreddits: usize,
}

/// Contributions made by the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditContributions {
    pub comments: Vec<SubredditActivity>,
    pub votes: Vec<Vote>,
    pub posts: Vec<SubredditActivity>,
    pub messages: Vec<RedditMessage>,
}

/// One login record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpLog {
    pub date: String,
    pub ip: String,
}

/// A comment or post, dated and attributed to a subreddit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubredditActivity {
    /// Export timestamp, e.g. `2021-03-04 12:34:56 UTC`.
    pub date: String,
    pub subreddit: String,
}

/// A post vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub subreddit: String,
    /// `true` for an upvote, `false` for a downvote.
    pub direction: bool,
}

/// A private message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditMessage {
    pub date: String,
    pub from: String,
}
