//! Plain-text persistence under a data directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MirrorError, Result};

/// Write `content` to `data_dir/<name>`, creating the directory if needed.
///
/// Only the final path segment of `name` is used.
pub fn save_text_to_file(data_dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| MirrorError::Config(format!("invalid file name: {:?}", name)))?;

    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(file_name);
    fs::write(&path, content)?;

    debug!("Saved {} bytes to {}", content.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("data");

        let path = save_text_to_file(&data_dir, "reddit.json", "{}").unwrap();

        assert_eq!(path, data_dir.join("reddit.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_save_keeps_only_file_name() {
        let dir = tempfile::tempdir().unwrap();

        let path = save_text_to_file(dir.path(), "../escape/record.json", "x").unwrap();
        assert_eq!(path, dir.path().join("record.json"));

        assert!(save_text_to_file(dir.path(), "..", "x").is_err());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();

        save_text_to_file(dir.path(), "a.txt", "first").unwrap();
        let path = save_text_to_file(dir.path(), "a.txt", "second").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }
}
