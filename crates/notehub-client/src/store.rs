//! Local file store for transferred images.
//!
//! Owns the saved-files directory. The chunker reads whole source files
//! from it, the reassembler appends arriving fragments into it, and the
//! retrieval endpoint serves from it.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use notehub_core::{AppError, AppResult};

/// Handle on the saved-files directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a named object in full.
    pub async fn read(&self, name: &str) -> AppResult<Vec<u8>> {
        let path = self.object_path(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::storage(format!("unable to read {name:?}: {e}")))
    }

    /// Appends bytes to a named object, creating it if absent.
    ///
    /// Append-only: repeated application of the same fragment duplicates
    /// its data.
    pub async fn append(&self, name: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.object_path(name)?;
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|e| AppError::storage(format!("unable to open {name:?}: {e}")))?;
        file.write_all(bytes).await?;
        Ok(())
    }

    /// Resolves an object name inside the root, rejecting traversal.
    fn object_path(&self, name: &str) -> AppResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(AppError::validation(format!("invalid object name {name:?}")));
        }
        Ok(self.root.join(name))
    }
}
