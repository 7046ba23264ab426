//! Core library for social-media data-export archives.
//!
//! This crate provides:
//! - Archive reading (zip entries filtered by extension, decoded concurrently)
//! - Tabular (CSV) and hierarchical (JSON) parsing into one value shape
//! - Provider field-extraction rules for Reddit and Instagram exports
//! - Normalized per-provider records and the aggregations dashboards draw from

pub mod error;
pub mod models;
pub mod archive;
pub mod parser;
pub mod extract;
pub mod summary;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use error::{MirrorError, Result};
pub use models::config::MirrorConfig;
pub use models::instagram::InstagramData;
pub use models::reddit::RedditData;
pub use archive::{ArchiveReader, DecodedEntry};
pub use parser::{ParserAdapter, SourceFormat};
pub use extract::{
    ArchiveExtractor, ExtractionResult, NormalizedRecord, Provider, Providers, Rule, RuleSet,
};
pub use summary::{InstagramSummary, RedditSummary};
