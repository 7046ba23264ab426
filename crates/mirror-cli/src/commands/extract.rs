//! Extract command - build a normalized record from an export archive.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use mirror_core::storage::save_text_to_file;
use mirror_core::{
    ArchiveExtractor, InstagramData, NormalizedRecord, Provider, Providers, RedditData,
};

use super::config::{data_dir, load_config};
use super::{read_archive, ProviderArg};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Export archive (zip); only the first file is read
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Export provider
    #[arg(short, long, value_enum)]
    provider: ProviderArg,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print dashboard aggregations instead of the raw record
    #[arg(long)]
    summary: bool,

    /// Also store the JSON record in the data directory
    #[arg(long)]
    save: bool,

    /// Skip entries that cannot be parsed instead of failing
    #[arg(long)]
    skip_malformed: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text digest
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let provider = Provider::from(args.provider);

    let (input, ignored) = args
        .inputs
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("No input file given"))?;
    for path in ignored {
        warn!("Only one archive is read per run, ignoring {}", path.display());
    }

    info!("Extracting {} export: {}", provider, input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Reading archive...");

    let data = read_archive(input)?;
    let providers = Providers::from_config(&config.providers);
    let extractor = ArchiveExtractor::from_config(&config)
        .with_skip_malformed(args.skip_malformed || config.extraction.skip_malformed_entries);

    pb.set_message("Extracting fields...");
    let result = match extractor.extract_provider(data, provider, &providers).await {
        Ok(result) => result,
        Err(e) if e.is_invalid_format() => {
            pb.finish_and_clear();
            anyhow::bail!("invalid format");
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
    debug!(
        "{} entries read, {} applied in {}ms",
        result.entries_read,
        result.entries_applied.len(),
        result.processing_time_ms
    );

    if args.save {
        let json = serde_json::to_string_pretty(&result.record)?;
        let path = save_text_to_file(&data_dir(&config), &format!("{}.json", provider), &json)?;
        eprintln!("{} Record saved to {}", style("✓").green(), path.display());
    }

    let output = if args.summary {
        format_summary(&result.record, args.format)?
    } else {
        format_record(&result.record, args.format)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record(record: &NormalizedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(&timeline(record)),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_summary(record: &NormalizedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match (record, format) {
        (NormalizedRecord::Reddit(data), OutputFormat::Json) => {
            Ok(serde_json::to_string(&data.summary())?)
        }
        (NormalizedRecord::Instagram(data), OutputFormat::Json) => {
            Ok(serde_json::to_string(&data.summary())?)
        }
        (NormalizedRecord::Reddit(data), OutputFormat::Csv) => {
            format_monthly_csv(&data.summary().contributions_per_month)
        }
        (NormalizedRecord::Instagram(data), OutputFormat::Csv) => {
            format_monthly_csv(&data.summary().contributions_per_month)
        }
        (_, OutputFormat::Text) => Ok(format_text(record)),
    }
}

/// One dated fact of a record.
struct TimelineRow {
    kind: &'static str,
    date: String,
    value: String,
}

impl TimelineRow {
    fn new(kind: &'static str, date: impl Into<String>, value: impl Into<String>) -> Self {
        Self { kind, date: date.into(), value: value.into() }
    }

    fn at(kind: &'static str, date: &DateTime<Utc>, value: impl Into<String>) -> Self {
        Self::new(kind, date.to_rfc3339_opts(SecondsFormat::Secs, true), value)
    }
}

fn timeline(record: &NormalizedRecord) -> Vec<TimelineRow> {
    match record {
        NormalizedRecord::Reddit(data) => reddit_timeline(data),
        NormalizedRecord::Instagram(data) => instagram_timeline(data),
    }
}

fn reddit_timeline(data: &RedditData) -> Vec<TimelineRow> {
    let contributions = &data.contributions;
    let mut rows = Vec::new();

    rows.extend(data.ip_logs.iter().map(|log| TimelineRow::new("ip_log", &log.date, &log.ip)));
    rows.extend(
        contributions
            .comments
            .iter()
            .map(|c| TimelineRow::new("comment", &c.date, &c.subreddit)),
    );
    rows.extend(
        contributions
            .posts
            .iter()
            .map(|p| TimelineRow::new("post", &p.date, &p.subreddit)),
    );
    rows.extend(
        contributions
            .messages
            .iter()
            .map(|m| TimelineRow::new("message", &m.date, &m.from)),
    );

    rows
}

fn instagram_timeline(data: &InstagramData) -> Vec<TimelineRow> {
    let contributions = &data.contributions;
    let mut rows = Vec::new();

    rows.extend(contributions.comments.iter().map(|d| TimelineRow::at("comment", d, "")));
    rows.extend(
        contributions
            .messages
            .iter()
            .map(|m| TimelineRow::at("message", &m.date, &m.participant)),
    );
    rows.extend(contributions.posts.iter().map(|d| TimelineRow::at("post", d, "")));
    rows.extend(contributions.likes.iter().map(|d| TimelineRow::at("like", d, "")));
    rows.extend(contributions.stories.iter().map(|d| TimelineRow::at("story", d, "")));

    rows
}

fn format_csv(rows: &[TimelineRow]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["kind", "date", "value"])?;
    for row in rows {
        wtr.write_record([row.kind, row.date.as_str(), row.value.as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// `month,kind,count` rows from a per-month breakdown.
fn format_monthly_csv<M: Serialize>(
    months: &std::collections::BTreeMap<String, M>,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "kind", "count"])?;
    for (month, counts) in months {
        if let serde_json::Value::Object(counts) = serde_json::to_value(counts)? {
            for (kind, count) in counts {
                wtr.write_record([month.as_str(), kind.as_str(), count.to_string().as_str()])?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &NormalizedRecord) -> String {
    match record {
        NormalizedRecord::Reddit(data) => format_reddit_text(data),
        NormalizedRecord::Instagram(data) => format_instagram_text(data),
    }
}

fn format_reddit_text(data: &RedditData) -> String {
    let summary = data.summary();
    let contributions = &data.contributions;
    let mut output = String::new();

    output.push_str("Reddit export\n");
    if !data.gender.is_empty() {
        output.push_str(&format!("Gender: {}\n", data.gender));
    }
    output.push_str(&format!("Subscribed subreddits: {}\n", data.subreddits));
    output.push_str(&format!("Logged IPs: {}\n", data.ip_logs.len()));
    output.push('\n');

    output.push_str("Contributions:\n");
    output.push_str(&format!("  Comments: {}\n", contributions.comments.len()));
    output.push_str(&format!("  Posts:    {}\n", contributions.posts.len()));
    output.push_str(&format!("  Votes:    {}\n", contributions.votes.len()));
    output.push_str(&format!("  Messages: {}\n", contributions.messages.len()));

    if !summary.comments_per_subreddit.is_empty() {
        output.push('\n');
        output.push_str("Comments per subreddit:\n");
        for (subreddit, count) in &summary.comments_per_subreddit {
            output.push_str(&format!("  r/{}: {}\n", subreddit, count));
        }
    }

    output
}

fn format_instagram_text(data: &InstagramData) -> String {
    let summary = data.summary();
    let contributions = &data.contributions;
    let mut output = String::new();

    output.push_str("Instagram export\n");
    output.push_str(&format!("Followers:  {}\n", summary.follower_count));
    output.push_str(&format!("Followings: {}\n", summary.following_count));
    output.push_str(&format!("Mutuals:    {}\n", summary.mutuals.len()));
    output.push('\n');

    output.push_str("Contributions:\n");
    output.push_str(&format!("  Comments: {}\n", contributions.comments.len()));
    output.push_str(&format!("  Messages: {}\n", contributions.messages.len()));
    output.push_str(&format!("  Posts:    {}\n", contributions.posts.len()));
    output.push_str(&format!("  Likes:    {}\n", contributions.likes.len()));
    output.push_str(&format!("  Stories:  {}\n", contributions.stories.len()));

    if !data.interests.ads.is_empty() || !data.interests.topics.is_empty() {
        output.push('\n');
        output.push_str(&format!("Ad interests: {}\n", data.interests.ads.join(", ")));
        output.push_str(&format!("Topics: {}\n", data.interests.topics.join(", ")));
    }

    output
}
