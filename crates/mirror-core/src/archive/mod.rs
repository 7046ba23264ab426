//! Export archive reading.

mod reader;

pub use reader::{ArchiveEntry, ArchiveReader, DecodedEntry};

use crate::error::ArchiveError;

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Final path segment of an archive path; the canonical name rules match on.
pub fn canonical_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
