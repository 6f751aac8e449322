//! Uniform access to the session-scoped and durable stores.

use rehearse_core::config::ContinuityConfig;
use rehearse_core::error::Result;
use rehearse_core::storage::{KeyValueStore, StorageScope};
use std::path::PathBuf;
use std::sync::Arc;

use super::file_store::FileStore;
use super::memory_store::MemoryStore;

/// Routes reads and writes to the store of the requested scope.
///
/// Both stores are shared, process-wide resources; the adapter adds no
/// locking, so concurrent writers resolve as last-writer-wins.
#[derive(Clone)]
pub struct StorageAdapter {
    session: Arc<dyn KeyValueStore>,
    durable: Arc<dyn KeyValueStore>,
}

impl StorageAdapter {
    pub fn new(session: Arc<dyn KeyValueStore>, durable: Arc<dyn KeyValueStore>) -> Self {
        Self { session, durable }
    }

    /// Both scopes in memory. Useful for tests and ephemeral embeddings.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// In-memory session scope, file-backed durable scope at `storage_dir`,
    /// with the quotas from `config`.
    pub fn from_config(config: &ContinuityConfig, storage_dir: PathBuf) -> Self {
        let session = match config.session_quota_bytes {
            Some(quota) => MemoryStore::with_quota(quota),
            None => MemoryStore::new(),
        };
        let mut durable = FileStore::new(storage_dir);
        if let Some(quota) = config.durable_quota_bytes {
            durable = durable.with_quota(quota);
        }
        Self::new(Arc::new(session), Arc::new(durable))
    }

    fn store(&self, scope: StorageScope) -> &Arc<dyn KeyValueStore> {
        match scope {
            StorageScope::Session => &self.session,
            StorageScope::Durable => &self.durable,
        }
    }

    pub async fn write(&self, scope: StorageScope, key: &str, value: &str) -> Result<()> {
        tracing::debug!("storage write: scope={} key={} bytes={}", scope, key, value.len());
        self.store(scope).set(key, value).await
    }

    /// Returns `Ok(None)` for a missing key; never an error for absence.
    pub async fn read(&self, scope: StorageScope, key: &str) -> Result<Option<String>> {
        self.store(scope).get(key).await
    }

    pub async fn remove(&self, scope: StorageScope, key: &str) -> Result<()> {
        tracing::debug!("storage remove: scope={} key={}", scope, key);
        self.store(scope).remove(key).await
    }
}
