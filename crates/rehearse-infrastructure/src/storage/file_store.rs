//! File-backed key-value store.
//!
//! Used as the durable store. Each key is one file in a directory:
//!
//! ```text
//! storage_dir/
//! ├── rehearse.interview_session.backup.json
//! ├── rehearse.interview_session.backup%3Auser-42.json
//! └── rehearse.last_identity.json
//! ```
//!
//! Writes go to a temporary file in the same directory followed by an atomic
//! rename, so a crash mid-write leaves the previous value intact.

use async_trait::async_trait;
use rehearse_core::error::{RehearseError, Result};
use rehearse_core::storage::KeyValueStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const FILE_EXTENSION: &str = "json";

/// Durable store rooted at a directory, with an optional total byte quota.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to its file, escaping anything outside `[A-Za-z0-9._-]`.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                    name.push(byte as char)
                }
                other => name.push_str(&format!("%{:02X}", other)),
            }
        }
        self.dir.join(format!("{}.{}", name, FILE_EXTENSION))
    }

    /// Total bytes held by every stored value except `exclude`.
    async fn used_bytes_excluding(&self, exclude: &Path) -> Result<usize> {
        let mut total = 0usize;
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(map_io_error("<quota scan>", e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| map_io_error("<quota scan>", e))?
        {
            let path = entry.path();
            if path == exclude
                || path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION)
            {
                continue;
            }
            if let Ok(metadata) = entry.metadata().await {
                total += metadata.len() as usize;
            }
        }
        Ok(total)
    }
}

/// Converts I/O failures into the storage error kinds.
fn map_io_error(key: &str, err: std::io::Error) -> RehearseError {
    match err.kind() {
        ErrorKind::StorageFull | ErrorKind::FileTooLarge => {
            RehearseError::quota_exceeded(key, err.to_string())
        }
        _ => RehearseError::unavailable(format!("'{}': {} (kind: {:?})", key, err, err.kind())),
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_excluding(&path).await? + value.len();
            if needed > quota {
                return Err(RehearseError::quota_exceeded(
                    key,
                    format!("{} bytes needed, quota is {} bytes", needed, quota),
                ));
            }
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| map_io_error(key, e))?;

        let tmp_path = self
            .dir
            .join(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));

        let write_result = async {
            let mut tmp_file = fs::File::create(&tmp_path).await?;
            tmp_file.write_all(value.as_bytes()).await?;
            // Ensure data is on disk before the rename makes it visible
            tmp_file.sync_all().await?;
            drop(tmp_file);
            fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(map_io_error(key, e));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_keys_are_total() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("not-yet-created"));

        assert_eq!(store.get("absent").await.unwrap(), None);
        store.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let temp = TempDir::new().unwrap();
        FileStore::new(temp.path())
            .set("rehearse.interview_session.backup", "{\"a\":1}")
            .await
            .unwrap();

        let reopened = FileStore::new(temp.path());
        assert_eq!(
            reopened
                .get("rehearse.interview_session.backup")
                .await
                .unwrap()
                .as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[tokio::test]
    async fn test_keys_with_separators_are_escaped() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("backup:user/../42", "x").await.unwrap();

        let path = store.path_for("backup:user/../42");
        assert_eq!(path.parent(), Some(temp.path()));
        assert!(path.exists());
        assert_eq!(store.get("backup:user/../42").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("k", "v").await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path()).with_quota(16);

        store.set("a", "0123456789").await.unwrap();
        let err = store.set("b", "0123456789").await.unwrap_err();
        assert!(err.is_quota_exceeded());

        // Rewriting an existing key only counts its new size
        store.set("a", "0123456789abcdef").await.unwrap();
    }
}
