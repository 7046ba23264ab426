//! Rules for Reddit exports (CSV, one row object per line).

use serde_json::Value;
use tracing::debug;

use crate::extract::values::{get_str, get_value, populate_array, rows};
use crate::extract::{Provider, Result, RuleSet};
use crate::models::config::RedditFiles;
use crate::models::reddit::{RedditData, Vote};
use crate::parser::SourceFormat;

/// Vote direction marking a removed vote.
const NO_VOTE: &str = "none";
const UPVOTE: &str = "up";
const SUBREDDIT_MARKER: &str = "/r/";

/// Build the Reddit rule set for the configured entry names.
pub fn rule_set(files: &RedditFiles) -> RuleSet<RedditData> {
    RuleSet::new(Provider::Reddit, SourceFormat::Tabular)
        .with_rule(files.gender.as_str(), gender)
        .with_rule(files.ip_logs.as_str(), ip_logs)
        .with_rule(files.comments.as_str(), comments)
        .with_rule(files.posts.as_str(), posts)
        .with_rule(files.votes.as_str(), votes)
        .with_rule(files.messages.as_str(), messages)
        .with_rule(files.subreddits.as_str(), subreddits)
}

fn gender(data: &mut RedditData, content: &Value) -> Result<()> {
    if let Some(gender) = rows(content).first().and_then(|row| get_str(row, "account_gender")) {
        data.gender = gender.to_string();
    }
    Ok(())
}

fn ip_logs(data: &mut RedditData, content: &Value) -> Result<()> {
    populate_array(&mut data.ip_logs, content, &["date", "ip"])
}

fn comments(data: &mut RedditData, content: &Value) -> Result<()> {
    populate_array(&mut data.contributions.comments, content, &["date", "subreddit"])
}

fn posts(data: &mut RedditData, content: &Value) -> Result<()> {
    populate_array(&mut data.contributions.posts, content, &["date", "subreddit"])
}

fn messages(data: &mut RedditData, content: &Value) -> Result<()> {
    populate_array(&mut data.contributions.messages, content, &["date", "from"])
}

fn votes(data: &mut RedditData, content: &Value) -> Result<()> {
    for row in rows(content) {
        let (Some(permalink), Some(direction)) = (
            get_value(row, "permalink").and_then(Value::as_str),
            get_value(row, "direction").and_then(Value::as_str),
        ) else {
            continue;
        };

        if direction == NO_VOTE {
            continue;
        }

        match subreddit_from_permalink(permalink) {
            Some(subreddit) => data.contributions.votes.push(Vote {
                subreddit: subreddit.to_string(),
                direction: direction == UPVOTE,
            }),
            None => debug!("Vote permalink without subreddit: {}", permalink),
        }
    }
    Ok(())
}

fn subreddits(data: &mut RedditData, content: &Value) -> Result<()> {
    data.subreddits = rows(content).len();
    Ok(())
}

/// Subreddit name between the first `/r/` and the next `/` after it.
///
/// Runs to the end of the permalink when no `/` follows.
pub fn subreddit_from_permalink(permalink: &str) -> Option<&str> {
    let start = permalink.find(SUBREDDIT_MARKER)? + SUBREDDIT_MARKER.len();
    let rest = &permalink[start..];
    let end = rest.find('/').unwrap_or(rest.len());
    Some(&rest[..end])
}
