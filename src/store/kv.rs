use async_trait::async_trait;

use crate::error::Result;

/// A minimal key/value persistence capability.
///
/// The session core is storage-medium-agnostic: anything that can get,
/// set, and delete string keys can back it. The crate ships
/// [`MemoryStore`](crate::store::memory::MemoryStore) and
/// [`FileStore`](crate::store::file::FileStore); deployments may supply
/// their own (embedded DB, OS secret store).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
