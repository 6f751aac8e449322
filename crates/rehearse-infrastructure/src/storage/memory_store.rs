//! In-memory key-value store.
//!
//! Used as the session-scoped store: its contents live exactly as long as
//! the process (the equivalent of a browser tab).

use async_trait::async_trait;
use rehearse_core::error::{RehearseError, Result};
use rehearse_core::storage::KeyValueStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Process-lifetime store with an optional byte quota.
///
/// The quota counts the bytes of every key and value held, mirroring how
/// browser storage accounts for capacity.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: None,
            available: AtomicBool::new(true),
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// Simulates the store becoming unreadable/unwritable (private browsing,
    /// disabled storage).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Drops every entry, as when the tab is closed.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RehearseError::unavailable("in-memory store disabled"))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_available()?;
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(RehearseError::quota_exceeded(
                    key,
                    format!("{} bytes needed, quota is {} bytes", needed, quota),
                ));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_keys_are_total() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
        store.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);

        store.remove("k").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_quota_rejects_without_dropping_previous_value() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "12345").await.unwrap();

        let err = store.set("k", "1234567890").await.unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_replacing_a_key_does_not_double_count() {
        let store = MemoryStore::with_quota(8);
        store.set("k", "1234567").await.unwrap();
        store.set("k", "7654321").await.unwrap();
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(store.get("k").await.unwrap_err().is_unavailable());
        assert!(store.set("k", "v").await.unwrap_err().is_unavailable());

        store.set_available(true);
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
