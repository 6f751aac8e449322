//! Key-value storage contract.
//!
//! Defines the interface the continuity layer persists through, decoupling it
//! from the concrete store (in-memory, files, browser storage bridge, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Lifetime class of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    /// Cleared when the tab/session ends
    Session,
    /// Survives restarts until explicitly cleared
    Durable,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::Session => write!(f, "session"),
            StorageScope::Durable => write!(f, "durable"),
        }
    }
}

/// A single string-valued key-value store.
///
/// # Implementation Notes
///
/// Implementations must be total over missing keys:
/// - `get` returns `Ok(None)` for a key that was never written
/// - `remove` of a missing key is `Ok(())`
///
/// Capacity failures must be reported as
/// [`RehearseError::StorageQuotaExceeded`](crate::error::RehearseError::StorageQuotaExceeded)
/// rather than silently dropping the value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` if present.
    async fn remove(&self, key: &str) -> Result<()>;
}
