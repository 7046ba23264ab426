//! Rules for Instagram exports (JSON documents).
//!
//! Most Instagram entries wrap their records in a single named array, and
//! each record keeps its payload in a one-element `string_list_data` array.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::{from_epoch_millis, from_epoch_seconds};
use crate::extract::values::{first_in, get_nested_value, get_str, get_value, rows};
use crate::extract::{Provider, Result, RuleSet};
use crate::models::config::InstagramFiles;
use crate::models::instagram::{InstagramData, InstagramMessage};
use crate::parser::SourceFormat;

const STRING_LIST: &str = "string_list_data";
const MAX_CONVERSATION_PARTICIPANTS: usize = 2;

/// Build the Instagram rule set for the configured entry names.
pub fn rule_set(files: &InstagramFiles) -> RuleSet<InstagramData> {
    RuleSet::new(Provider::Instagram, SourceFormat::Hierarchical)
        .with_rule(files.comments.as_str(), comments)
        .with_rule(files.messages.as_str(), messages)
        .with_rule(files.posts.as_str(), posts)
        .with_rule(files.likes.as_str(), likes)
        .with_rule(files.followers.as_str(), followers)
        .with_rule(files.followings.as_str(), followings)
        .with_rule(files.ads_interests.as_str(), ads_interests)
        .with_rule(files.your_topics.as_str(), your_topics)
        .with_rule(files.stories.as_str(), stories)
}

fn comments(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.contributions.comments = wrapped_timestamps(content, "comments_media_comments");
    Ok(())
}

fn likes(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.contributions.likes = wrapped_timestamps(content, "likes_media_likes");
    Ok(())
}

fn posts(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.contributions.posts = rows(content)
        .iter()
        .filter_map(|post| first_in(post, "media"))
        .filter_map(|media| get_value(media, "creation_timestamp"))
        .filter_map(from_epoch_seconds)
        .collect();
    Ok(())
}

fn stories(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.contributions.stories = get_nested_value(content, "ig_stories.creation_timestamp")
        .as_ref()
        .map(rows)
        .unwrap_or_default()
        .iter()
        .filter_map(from_epoch_seconds)
        .collect();
    Ok(())
}

fn followers(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.relationships.followers = wrapped_values(content, "relationships_followers");
    Ok(())
}

fn followings(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.relationships.followings = wrapped_values(content, "relationships_following");
    Ok(())
}

fn ads_interests(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.interests.ads = nested_strings(
        content,
        "inferred_data_ig_interest.string_map_data.Interest.value",
    );
    Ok(())
}

fn your_topics(data: &mut InstagramData, content: &Value) -> Result<()> {
    data.interests.topics = nested_strings(content, "topics_your_topics.string_map_data.Name.value");
    Ok(())
}

/// One-to-one conversations only; messages accumulate across threads.
///
/// The first listed participant is taken as the conversation partner and
/// messages authored by that name are dropped.
fn messages(data: &mut InstagramData, content: &Value) -> Result<()> {
    let participants = get_value(content, "participants").map(rows).unwrap_or_default();

    if participants.len() > MAX_CONVERSATION_PARTICIPANTS {
        debug!("Skipping group conversation with {} participants", participants.len());
        return Ok(());
    }

    let Some(participant) = participants.first().and_then(|p| get_str(p, "name")) else {
        return Ok(());
    };

    let thread = get_value(content, "messages").map(rows).unwrap_or_default();
    let kept = thread.iter().filter_map(|message| {
        let sender = get_str(message, "sender_name")?;
        if sender == participant {
            return None;
        }
        let date = get_value(message, "timestamp_ms").and_then(from_epoch_millis)?;
        Some(InstagramMessage {
            participant: participant.to_string(),
            sender: sender.to_string(),
            date,
        })
    });

    data.contributions.messages.extend(kept);
    Ok(())
}

/// Records of an entry: the array under `wrapper`, or the top-level array itself.
fn wrapped_records<'a>(content: &'a Value, wrapper: &str) -> &'a [Value] {
    match get_value(content, wrapper) {
        Some(records) => rows(records),
        None => rows(content),
    }
}

/// `timestamp` of the first `string_list_data` item of every wrapped record.
fn wrapped_timestamps(content: &Value, wrapper: &str) -> Vec<DateTime<Utc>> {
    wrapped_records(content, wrapper)
        .iter()
        .filter_map(|record| first_in(record, STRING_LIST))
        .filter_map(|item| get_value(item, "timestamp"))
        .filter_map(from_epoch_seconds)
        .collect()
}

/// `value` of the first `string_list_data` item of every wrapped record.
fn wrapped_values(content: &Value, wrapper: &str) -> Vec<String> {
    wrapped_records(content, wrapper)
        .iter()
        .filter_map(|record| first_in(record, STRING_LIST))
        .filter_map(|item| get_str(item, "value"))
        .map(str::to_string)
        .collect()
}

fn nested_strings(content: &Value, dotted_key: &str) -> Vec<String> {
    get_nested_value(content, dotted_key)
        .as_ref()
        .map(rows)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
