//! Local filesystem storage for downloaded images.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {site label} - {post title}/
//!     ├── abc123.jpg
//!     └── def456.png
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::utils::path_exists;

/// Suffix of files being written, removed by the final rename.
const TMP_SUFFIX: &str = ".tmp";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Whether anything exists at `key`.
    pub async fn exists(&self, key: &str) -> bool {
        path_exists(&self.path(key)).await
    }

    /// Create the directory at `key` and its parents. Existing ones are fine.
    pub async fn ensure_dir(&self, key: &str) -> Result<PathBuf> {
        let path = self.path(key);
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(TMP_SUFFIX);
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}
