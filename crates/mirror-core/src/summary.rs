//! Aggregations over normalized records, as drawn by the dashboards.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::instagram::InstagramData;
use crate::models::reddit::{RedditData, SubredditActivity};

/// Date format of Reddit export timestamps.
pub const REDDIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Counts per hour of day (UTC), index 0 = midnight.
pub type HourHistogram = [usize; 24];

/// Parse a Reddit export timestamp.
pub fn parse_reddit_date(date: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(date.trim(), REDDIT_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Month key (`YYYY-MM`) of an instant.
pub fn month_key(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m").to_string()
}

/// Number of instants per month.
pub fn per_month<'a>(instants: impl IntoIterator<Item = &'a DateTime<Utc>>) -> BTreeMap<String, usize> {
    let mut months = BTreeMap::new();
    for instant in instants {
        *months.entry(month_key(instant)).or_insert(0) += 1;
    }
    months
}

/// Number of instants per hour of day.
pub fn per_hour<'a>(instants: impl IntoIterator<Item = &'a DateTime<Utc>>) -> HourHistogram {
    let mut hours = [0; 24];
    for instant in instants {
        hours[instant.hour() as usize] += 1;
    }
    hours
}

/// Instagram contributions in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramMonth {
    pub messages: usize,
    pub posts: usize,
    pub likes: usize,
    pub stories: usize,
    pub comments: usize,
}

/// Dashboard figures for an Instagram export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramSummary {
    pub follower_count: usize,
    pub following_count: usize,
    /// Followers the user also follows, in follower order.
    pub mutuals: Vec<String>,
    /// Kept messages per conversation partner.
    pub message_distribution: BTreeMap<String, usize>,
    pub contributions_per_month: BTreeMap<String, InstagramMonth>,
    pub likes_per_hour: HourHistogram,
    pub messages_per_hour: HourHistogram,
    pub stories_per_hour: HourHistogram,
    pub comments_per_hour: HourHistogram,
}

impl InstagramData {
    pub fn summary(&self) -> InstagramSummary {
        let contributions = &self.contributions;
        let relationships = &self.relationships;

        let followings: HashSet<&str> =
            relationships.followings.iter().map(String::as_str).collect();
        let mutuals = relationships
            .followers
            .iter()
            .filter(|follower| followings.contains(follower.as_str()))
            .cloned()
            .collect();

        let mut message_distribution = BTreeMap::new();
        for message in &contributions.messages {
            *message_distribution.entry(message.participant.clone()).or_insert(0) += 1;
        }

        let mut months: BTreeMap<String, InstagramMonth> = BTreeMap::new();
        for message in &contributions.messages {
            months.entry(month_key(&message.date)).or_default().messages += 1;
        }
        for post in &contributions.posts {
            months.entry(month_key(post)).or_default().posts += 1;
        }
        for like in &contributions.likes {
            months.entry(month_key(like)).or_default().likes += 1;
        }
        for story in &contributions.stories {
            months.entry(month_key(story)).or_default().stories += 1;
        }
        for comment in &contributions.comments {
            months.entry(month_key(comment)).or_default().comments += 1;
        }

        InstagramSummary {
            follower_count: relationships.followers.len(),
            following_count: relationships.followings.len(),
            mutuals,
            message_distribution,
            contributions_per_month: months,
            likes_per_hour: per_hour(&contributions.likes),
            messages_per_hour: per_hour(contributions.messages.iter().map(|m| &m.date)),
            stories_per_hour: per_hour(&contributions.stories),
            comments_per_hour: per_hour(&contributions.comments),
        }
    }
}

/// Reddit contributions in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditMonth {
    pub comments: usize,
    pub posts: usize,
    pub messages: usize,
}

/// Up and down votes in one subreddit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub up: usize,
    pub down: usize,
}

/// Dashboard figures for a Reddit export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditSummary {
    pub comments_per_subreddit: BTreeMap<String, usize>,
    pub posts_per_subreddit: BTreeMap<String, usize>,
    pub votes_per_subreddit: BTreeMap<String, VoteTally>,
    pub message_count: usize,
    pub subreddit_count: usize,
    /// Months of dated contributions; rows with unparseable dates are left out.
    pub contributions_per_month: BTreeMap<String, RedditMonth>,
    pub comments_per_hour: HourHistogram,
}

impl RedditData {
    pub fn summary(&self) -> RedditSummary {
        let contributions = &self.contributions;

        let mut votes_per_subreddit: BTreeMap<String, VoteTally> = BTreeMap::new();
        for vote in &contributions.votes {
            let tally = votes_per_subreddit.entry(vote.subreddit.clone()).or_default();
            if vote.direction {
                tally.up += 1;
            } else {
                tally.down += 1;
            }
        }

        let comment_dates: Vec<DateTime<Utc>> = dated(&contributions.comments).collect();
        let mut months: BTreeMap<String, RedditMonth> = BTreeMap::new();
        for date in &comment_dates {
            months.entry(month_key(date)).or_default().comments += 1;
        }
        for date in dated(&contributions.posts) {
            months.entry(month_key(&date)).or_default().posts += 1;
        }
        for message in &contributions.messages {
            if let Some(date) = parse_reddit_date(&message.date) {
                months.entry(month_key(&date)).or_default().messages += 1;
            }
        }

        RedditSummary {
            comments_per_subreddit: per_subreddit(&contributions.comments),
            posts_per_subreddit: per_subreddit(&contributions.posts),
            votes_per_subreddit,
            message_count: contributions.messages.len(),
            subreddit_count: self.subreddits,
            contributions_per_month: months,
            comments_per_hour: per_hour(&comment_dates),
        }
    }
}

fn per_subreddit(activity: &[SubredditActivity]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in activity {
        *counts.entry(item.subreddit.clone()).or_insert(0) += 1;
    }
    counts
}

fn dated(activity: &[SubredditActivity]) -> impl Iterator<Item = DateTime<Utc>> + '_ {
    activity.iter().filter_map(|item| parse_reddit_date(&item.date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instagram::{InstagramMessage, Relationships};
    use crate::models::reddit::{RedditMessage, Vote};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_reddit_date() {
        assert_eq!(parse_reddit_date("2021-03-04 12:00:00 UTC"), Some(at(2021, 3, 4, 12)));
        assert_eq!(parse_reddit_date("yesterday"), None);
        assert_eq!(parse_reddit_date(""), None);
    }

    #[test]
    fn test_per_month_and_hour() {
        let instants = vec![at(2023, 1, 5, 9), at(2023, 1, 20, 9), at(2023, 2, 1, 23)];

        let months = per_month(&instants);
        assert_eq!(months.get("2023-01"), Some(&2));
        assert_eq!(months.get("2023-02"), Some(&1));

        let hours = per_hour(&instants);
        assert_eq!(hours[9], 2);
        assert_eq!(hours[23], 1);
        assert_eq!(hours.iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_instagram_summary() {
        let mut data = InstagramData::default();
        data.relationships = Relationships {
            followers: vec!["alice".into(), "bob".into(), "carol".into()],
            followings: vec!["carol".into(), "dave".into(), "alice".into()],
        };
        data.contributions.messages = vec![
            InstagramMessage { participant: "alice".into(), sender: "me".into(), date: at(2023, 1, 1, 10) },
            InstagramMessage { participant: "alice".into(), sender: "me".into(), date: at(2023, 1, 2, 10) },
            InstagramMessage { participant: "bob".into(), sender: "me".into(), date: at(2023, 2, 1, 11) },
        ];
        data.contributions.likes = vec![at(2023, 1, 3, 22)];
        data.contributions.posts = vec![at(2023, 2, 3, 8)];

        let summary = data.summary();

        assert_eq!(summary.follower_count, 3);
        assert_eq!(summary.following_count, 3);
        assert_eq!(summary.mutuals, vec!["alice", "carol"]);
        assert_eq!(summary.message_distribution.get("alice"), Some(&2));
        assert_eq!(summary.message_distribution.get("bob"), Some(&1));
        assert_eq!(
            summary.contributions_per_month.get("2023-01"),
            Some(&InstagramMonth { messages: 2, likes: 1, ..Default::default() })
        );
        assert_eq!(
            summary.contributions_per_month.get("2023-02"),
            Some(&InstagramMonth { messages: 1, posts: 1, ..Default::default() })
        );
        assert_eq!(summary.messages_per_hour[10], 2);
        assert_eq!(summary.likes_per_hour[22], 1);
    }

    #[test]
    fn test_reddit_summary() {
        let mut data = RedditData::default();
        data.subreddits = 4;
        data.contributions.comments = vec![
            SubredditActivity { date: "2021-03-04 12:00:00 UTC".into(), subreddit: "rust".into() },
            SubredditActivity { date: "2021-03-05 12:30:00 UTC".into(), subreddit: "rust".into() },
            SubredditActivity { date: "garbage".into(), subreddit: "golang".into() },
        ];
        data.contributions.posts = vec![SubredditActivity {
            date: "2021-04-01 00:00:00 UTC".into(),
            subreddit: "rust".into(),
        }];
        data.contributions.votes = vec![
            Vote { subreddit: "rust".into(), direction: true },
            Vote { subreddit: "rust".into(), direction: false },
            Vote { subreddit: "rust".into(), direction: true },
        ];
        data.contributions.messages = vec![RedditMessage {
            date: "2021-03-10 09:00:00 UTC".into(),
            from: "someone".into(),
        }];

        let summary = data.summary();

        assert_eq!(summary.comments_per_subreddit.get("rust"), Some(&2));
        assert_eq!(summary.comments_per_subreddit.get("golang"), Some(&1));
        assert_eq!(summary.posts_per_subreddit.get("rust"), Some(&1));
        assert_eq!(
            summary.votes_per_subreddit.get("rust"),
            Some(&VoteTally { up: 2, down: 1 })
        );
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.subreddit_count, 4);
        assert_eq!(
            summary.contributions_per_month.get("2021-03"),
            Some(&RedditMonth { comments: 2, posts: 0, messages: 1 })
        );
        assert_eq!(summary.comments_per_hour[12], 2);
    }

    #[test]
    fn test_empty_records_summarize_to_zero() {
        let summary = InstagramData::default().summary();
        assert_eq!(summary.follower_count, 0);
        assert!(summary.contributions_per_month.is_empty());
        assert_eq!(summary.comments_per_hour, [0; 24]);

        let summary = RedditData::default().summary();
        assert!(summary.votes_per_subreddit.is_empty());
        assert_eq!(summary.message_count, 0);
    }
}
