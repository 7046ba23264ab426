//! Zip archive reader decoding supported entries concurrently.

use std::io::{Cursor, Read};
use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::{debug, trace};
use zip::ZipArchive;

use super::{canonical_name, Result};
use crate::error::ArchiveError;
use crate::models::config::ArchiveConfig;

type SharedArchive = ZipArchive<Cursor<Arc<[u8]>>>;

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// An entry listed in the archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in enumeration order.
    pub index: usize,
    /// Full path inside the archive.
    pub path: String,
    pub is_directory: bool,
}

impl ArchiveEntry {
    /// Basename used for rule matching.
    pub fn name(&self) -> &str {
        canonical_name(&self.path)
    }
}

/// A kept entry decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    /// Full path inside the archive.
    pub path: String,
    /// Basename used for rule matching.
    pub name: String,
    pub text: String,
}

/// Reads export archives, keeping only entries with a supported extension.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    supported_extensions: Vec<String>,
}

impl ArchiveReader {
    /// Create a reader accepting the given extensions (with leading dot).
    pub fn new<I, S>(supported_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported_extensions: supported_extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self::new(config.supported_extensions.iter().cloned())
    }

    /// Whether an entry path carries a supported extension.
    ///
    /// Matching ignores ASCII case, so `POSTS.CSV` is kept as well.
    pub fn is_supported(&self, path: &str) -> bool {
        let name = canonical_name(path);
        match name.rfind('.') {
            Some(dot) => {
                let extension = &name[dot..];
                self.supported_extensions
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(extension))
            }
            None => false,
        }
    }

    /// List every entry in enumeration order, directories included.
    pub fn list(&self, data: impl Into<Arc<[u8]>>) -> Result<Vec<ArchiveEntry>> {
        let mut archive = open(data.into())?;
        list_entries(&mut archive)
    }

    /// List the non-directory entries this reader would decode.
    pub fn kept_entries(&self, data: impl Into<Arc<[u8]>>) -> Result<Vec<ArchiveEntry>> {
        Ok(self
            .list(data)?
            .into_iter()
            .filter(|entry| !entry.is_directory && self.is_supported(&entry.path))
            .collect())
    }

    /// Open the archive and decode every kept entry as text.
    ///
    /// Each kept entry is decompressed on its own blocking task; all tasks are
    /// joined before returning, in archive order. Any failing entry fails the
    /// whole batch.
    pub async fn read(&self, data: impl Into<Arc<[u8]>>) -> Result<Vec<DecodedEntry>> {
        let mut archive = open(data.into())?;

        let kept: Vec<ArchiveEntry> = list_entries(&mut archive)?
            .into_iter()
            .filter(|entry| {
                let keep = !entry.is_directory && self.is_supported(&entry.path);
                if !keep {
                    trace!("Ignoring archive entry {}", entry.path);
                }
                keep
            })
            .collect();

        debug!("Decoding {} of {} archive entries", kept.len(), archive.len());

        let handles: Vec<_> = kept
            .into_iter()
            .map(|entry| {
                let mut archive = archive.clone();
                tokio::task::spawn_blocking(move || decode_entry(&mut archive, entry))
            })
            .collect();

        try_join_all(handles.into_iter().map(|handle| async move {
            match handle.await {
                Ok(decoded) => decoded,
                Err(e) => Err(ArchiveError::Task(e.to_string())),
            }
        }))
        .await
    }
}

impl Default for ArchiveReader {
    fn default() -> Self {
        Self::from_config(&ArchiveConfig::default())
    }
}

fn open(data: Arc<[u8]>) -> Result<SharedArchive> {
    ZipArchive::new(Cursor::new(data)).map_err(ArchiveError::InvalidFormat)
}

fn list_entries(archive: &mut SharedArchive) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let file = archive.by_index_raw(index).map_err(|source| ArchiveError::EntryRead {
            name: format!("#{}", index),
            source,
        })?;
        entries.push(ArchiveEntry {
            index,
            path: file.name().to_string(),
            is_directory: file.is_dir(),
        });
    }

    Ok(entries)
}

fn decode_entry(archive: &mut SharedArchive, entry: ArchiveEntry) -> Result<DecodedEntry> {
    let mut file = archive
        .by_index(entry.index)
        .map_err(|source| ArchiveError::EntryRead {
            name: entry.path.clone(),
            source,
        })?;

    // Header sizes are untrusted.
    let mut raw = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
    file.read_to_end(&mut raw)
        .map_err(|source| ArchiveError::EntryIo {
            name: entry.path.clone(),
            source,
        })?;

    // Invalid sequences become U+FFFD; bytes never fail the batch.
    let mut text = String::from_utf8_lossy(&raw).into_owned();
    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }

    trace!("Decoded {} ({} bytes)", entry.path, text.len());

    Ok(DecodedEntry {
        name: entry.name().to_string(),
        path: entry.path,
        text,
    })
}
