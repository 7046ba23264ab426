//! Error types for the mirror-core library.

use thiserror::Error;

/// Main error type for the mirror library.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Archive loading or entry decoding error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A kept entry could not be parsed.
    #[error("failed to parse entry {entry}: {source}")]
    Parse {
        entry: String,
        #[source]
        source: ParseError,
    },

    /// A rule could not reshape an entry.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MirrorError {
    /// Whether the supplied bytes were not a readable archive at all.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, MirrorError::Archive(e) if e.is_invalid_format())
    }
}

/// Errors related to reading the export archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The bytes cannot be opened as a zip archive.
    #[error("invalid archive format: {0}")]
    InvalidFormat(#[source] zip::result::ZipError),

    /// An entry listed in the archive could not be opened.
    #[error("failed to read entry {name}: {source}")]
    EntryRead {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Decompressing an entry failed midway.
    #[error("failed to decompress entry {name}: {source}")]
    EntryIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A decode task panicked or was cancelled.
    #[error("decode task failed: {0}")]
    Task(String),
}

impl ArchiveError {
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ArchiveError::InvalidFormat(_))
    }
}

/// Errors related to parsing entry text.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Invalid JSON syntax.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid CSV content.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors related to provider field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A present value does not have the shape a typed reshape needs.
    #[error("unexpected shape for {field}: {reason}")]
    Shape { field: String, reason: String },
}

/// Result type for the mirror library.
pub type Result<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_detection() {
        let zip_err = zip::ZipArchive::new(std::io::Cursor::new(b"not a zip".to_vec())).unwrap_err();
        let err: MirrorError = ArchiveError::InvalidFormat(zip_err).into();
        assert!(err.is_invalid_format());

        let err = MirrorError::Config("bad".to_string());
        assert!(!err.is_invalid_format());
    }
}
