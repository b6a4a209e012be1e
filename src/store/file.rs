use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{AuthError, Result};
use crate::store::kv::KeyValueStore;

/// A file-backed key/value store: one file per key inside a directory.
///
/// Writes go to a temporary file first and are committed with a rename,
/// so a reader never observes a half-written value.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a `FileStore` rooted at `dir`, creating the directory if
    /// needed.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory holding one file per key.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `FileStore`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!("📦 FileStore opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        // Keys are storage field names, never paths.
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(AuthError::Storage(format!("invalid store key: {key:?}")));
        }
        Ok(self.dir.join(key))
    }

    /// The directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!("{key}.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get("access_token").await.unwrap(), None);

        store.set("access_token", "abc123").await.unwrap();
        assert_eq!(
            store.get("access_token").await.unwrap(),
            Some("abc123".to_string())
        );

        store.delete("access_token").await.unwrap();
        assert_eq!(store.get("access_token").await.unwrap(), None);

        // idempotent delete
        store.delete("access_token").await.unwrap();
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store.set("user", r#"{"id":1}"#).await.unwrap();
        }
        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            store.get("user").await.unwrap(),
            Some(r#"{"id":1}"#.to_string())
        );
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(store.get("../escape").await.is_err());
        assert!(store.set("a/b", "x").await.is_err());
    }
}
