//! Extraction orchestrator: archive → parsed entries → rules → record.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use super::{NormalizedRecord, Provider, Providers, RuleSet};
use crate::archive::ArchiveReader;
use crate::error::{MirrorError, Result};
use crate::models::config::MirrorConfig;
use crate::parser::ParserAdapter;

/// Result of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionResult<R> {
    /// Finalized record.
    pub record: R,
    /// Number of entries decoded from the archive.
    pub entries_read: usize,
    /// Archive paths of the entries a rule was applied to, in order.
    pub entries_applied: Vec<String>,
    /// Entries skipped because they could not be parsed.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl<R> ExtractionResult<R> {
    fn map<T>(self, f: impl FnOnce(R) -> T) -> ExtractionResult<T> {
        ExtractionResult {
            record: f(self.record),
            entries_read: self.entries_read,
            entries_applied: self.entries_applied,
            warnings: self.warnings,
            processing_time_ms: self.processing_time_ms,
        }
    }
}

/// Drives archive reading, parsing and rule dispatch.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    reader: ArchiveReader,
    parser: ParserAdapter,
    skip_malformed: bool,
}

impl ArchiveExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            reader: ArchiveReader::default(),
            parser: ParserAdapter::new(),
            skip_malformed: false,
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self {
            reader: ArchiveReader::from_config(&config.archive),
            parser: ParserAdapter::from_config(&config.extraction),
            skip_malformed: config.extraction.skip_malformed_entries,
        }
    }

    /// Skip entries that fail to parse instead of failing the run.
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    pub fn reader(&self) -> &ArchiveReader {
        &self.reader
    }

    /// Run the pipeline for one provider's rule set.
    ///
    /// The record is created only after the archive has been opened and every
    /// kept entry decoded; rules are then applied sequentially in archive
    /// order. Entries without a rule are never parsed.
    pub async fn extract<R: Default>(
        &self,
        data: impl Into<Arc<[u8]>>,
        rules: &RuleSet<R>,
    ) -> Result<ExtractionResult<R>> {
        let start = Instant::now();
        let entries = self.reader.read(data).await?;

        let mut record = R::default();
        let mut entries_applied = Vec::new();
        let mut warnings = Vec::new();

        for entry in &entries {
            let Some(rule) = rules.rule_for(&entry.name) else {
                trace!("No {} rule for {}", rules.provider(), entry.path);
                continue;
            };

            let applied = self
                .parser
                .parse(&entry.text, rules.format())
                .map_err(|source| MirrorError::Parse {
                    entry: entry.path.clone(),
                    source,
                })
                .and_then(|content| rule(&mut record, &content).map_err(MirrorError::from));

            match applied {
                Ok(()) => {
                    debug!("Applied {} rule for {}", rules.provider(), entry.path);
                    entries_applied.push(entry.path.clone());
                }
                Err(e) if self.skip_malformed => {
                    warn!("Skipping malformed entry {}: {}", entry.path, e);
                    warnings.push(format!("{}: {}", entry.path, e));
                }
                Err(e) => return Err(e),
            }
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} archive: {} entries read, {} rules applied in {}ms",
            rules.provider(),
            entries.len(),
            entries_applied.len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            record,
            entries_read: entries.len(),
            entries_applied,
            warnings,
            processing_time_ms,
        })
    }

    /// Run the pipeline for a provider chosen at runtime.
    pub async fn extract_provider(
        &self,
        data: impl Into<Arc<[u8]>>,
        provider: Provider,
        providers: &Providers,
    ) -> Result<ExtractionResult<NormalizedRecord>> {
        match provider {
            Provider::Reddit => Ok(self
                .extract(data, &providers.reddit)
                .await?
                .map(NormalizedRecord::Reddit)),
            Provider::Instagram => Ok(self
                .extract(data, &providers.instagram)
                .await?
                .map(NormalizedRecord::Instagram)),
        }
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArchiveError, ExtractionError};
    use crate::models::instagram::InstagramData;
    use crate::models::reddit::{RedditData, SubredditActivity, Vote};
    use crate::test_support::zip_bytes;
    use pretty_assertions::assert_eq;

    fn reddit_archive() -> Vec<u8> {
        zip_bytes(&[
            ("export/", b""),
            ("export/account_gender.csv", b"account_gender\nfemale\n"),
            (
                "export/comments.csv",
                b"id,permalink,date,ip,subreddit,gildings,link,parent,body,media\n\
                  c1,/r/rust/comments/a/b/c1/,2021-03-04 12:00:00 UTC,1.1.1.1,rust,0,,,hello,\n\
                  c2,/r/golang/comments/d/e/c2/,2021-03-05 08:30:00 UTC,1.1.1.1,golang,0,,,\"hi, there\",\n",
            ),
            (
                "export/post_votes.csv",
                b"id,permalink,direction\n\
                  v1,/r/learnprogramming/comments/xyz,up\n\
                  v2,/r/rust/comments/abc,down\n\
                  v3,/r/golang/comments/def,none\n",
            ),
            ("export/subscribed_subreddits.csv", b"subreddit\nrust\ngolang\n"),
            ("export/chat_history.csv", b"\"unterminated"),
            ("export/avatar.png", b"\x89PNG"),
        ])
    }

    #[tokio::test]
    async fn test_extract_reddit_archive() {
        let providers = Providers::default();
        let result = ArchiveExtractor::new()
            .extract(reddit_archive(), &providers.reddit)
            .await
            .unwrap();

        let data: RedditData = result.record;
        assert_eq!(data.gender, "female");
        assert_eq!(data.subreddits, 2);
        assert_eq!(
            data.contributions.comments,
            vec![
                SubredditActivity { date: "2021-03-04 12:00:00 UTC".into(), subreddit: "rust".into() },
                SubredditActivity { date: "2021-03-05 08:30:00 UTC".into(), subreddit: "golang".into() },
            ]
        );
        assert_eq!(
            data.contributions.votes,
            vec![
                Vote { subreddit: "learnprogramming".into(), direction: true },
                Vote { subreddit: "rust".into(), direction: false },
            ]
        );
        assert_eq!(result.entries_read, 5);
        assert_eq!(result.entries_applied.len(), 4);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_extract_is_deterministic() {
        let providers = Providers::default();
        let extractor = ArchiveExtractor::new();

        let first = extractor.extract(reddit_archive(), &providers.reddit).await.unwrap();
        let second = extractor.extract(reddit_archive(), &providers.reddit).await.unwrap();

        assert_eq!(first.record, second.record);
        assert_eq!(first.entries_applied, second.entries_applied);
    }

    #[tokio::test]
    async fn test_no_matching_entries_yields_empty_record() {
        let data = zip_bytes(&[("readme.txt", b"hi"), ("other.json", b"{}")]);
        let providers = Providers::default();

        let result = ArchiveExtractor::new()
            .extract(data, &providers.instagram)
            .await
            .unwrap();

        assert_eq!(result.record, InstagramData::default());
        assert!(result.entries_applied.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_non_utf8_entry_is_ignored() {
        let data = zip_bytes(&[
            ("account_gender.csv", b"account_gender\nfemale\n"),
            ("chat_history.csv", b"from,body\nJos\xe9,ol\xe1\n"),
        ]);
        let providers = Providers::default();

        let result = ArchiveExtractor::new()
            .extract(data, &providers.reddit)
            .await
            .unwrap();

        assert_eq!(result.record.gender, "female");
        assert_eq!(result.entries_applied, vec!["account_gender.csv"]);
    }

    #[tokio::test]
    async fn test_invalid_archive_fails_before_record() {
        let providers = Providers::default();

        let err = ArchiveExtractor::new()
            .extract_provider(b"PK\x03\x04 truncated".to_vec(), Provider::Reddit, &providers)
            .await
            .unwrap_err();

        assert!(err.is_invalid_format());
        assert!(matches!(err, MirrorError::Archive(ArchiveError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_malformed_entry_policy() {
        let data = zip_bytes(&[
            ("followers.json", b"{\"relationships_followers\": ["),
            (
                "following.json",
                b"{\"relationships_following\": [{\"string_list_data\": [{\"value\": \"bob\"}]}]}",
            ),
        ]);
        let providers = Providers::default();

        let err = ArchiveExtractor::new()
            .extract(data.clone(), &providers.instagram)
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Parse { ref entry, .. } if entry == "followers.json"));

        let result = ArchiveExtractor::new()
            .with_skip_malformed(true)
            .extract(data, &providers.instagram)
            .await
            .unwrap();
        assert_eq!(result.record.relationships.followings, vec!["bob"]);
        assert!(result.record.relationships.followers.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    fn strict_rule(count: &mut usize, content: &serde_json::Value) -> crate::extract::Result<()> {
        if !content.is_array() {
            return Err(ExtractionError::Shape {
                field: "rows".into(),
                reason: "expected an array".into(),
            });
        }
        *count += 1;
        Ok(())
    }

    #[tokio::test]
    async fn test_rule_error_follows_malformed_policy() {
        let data = zip_bytes(&[("a.json", b"{}"), ("b.json", b"[]")]);
        let rules = RuleSet::new(Provider::Instagram, crate::parser::SourceFormat::Hierarchical)
            .with_rule("a.json", strict_rule as crate::extract::Rule<usize>)
            .with_rule("b.json", strict_rule);

        let err = ArchiveExtractor::new()
            .extract(data.clone(), &rules)
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Extraction(ExtractionError::Shape { .. })));

        let result = ArchiveExtractor::new()
            .with_skip_malformed(true)
            .extract(data, &rules)
            .await
            .unwrap();
        assert_eq!(result.record, 1);
        assert_eq!(result.entries_applied, vec!["b.json"]);
    }

    #[tokio::test]
    async fn test_extract_instagram_messages_across_threads() {
        let data = zip_bytes(&[
            (
                "messages/inbox/alice_1/message_1.json",
                "{\"participants\": [{\"name\": \"Ren\u{00c3}\u{00a9}e\"}, {\"name\": \"Me\"}],\
                  \"messages\": [{\"sender_name\": \"Me\", \"timestamp_ms\": 1700000000000},\
                                 {\"sender_name\": \"Ren\u{00c3}\u{00a9}e\", \"timestamp_ms\": 1700000001000}]}"
                    .as_bytes(),
            ),
            (
                "messages/inbox/bob_2/message_1.json",
                b"{\"participants\": [{\"name\": \"Bob\"}, {\"name\": \"Me\"}],\
                   \"messages\": [{\"sender_name\": \"Me\", \"timestamp_ms\": 1700000002000}]}",
            ),
        ]);
        let providers = Providers::default();

        let result = ArchiveExtractor::new()
            .extract_provider(data, Provider::Instagram, &providers)
            .await
            .unwrap();

        let NormalizedRecord::Instagram(record) = result.record else {
            panic!("expected an Instagram record");
        };
        let partners: Vec<_> = record
            .contributions
            .messages
            .iter()
            .map(|m| m.participant.as_str())
            .collect();
        assert_eq!(partners, vec!["Renée", "Bob"]);
    }
}
