//! Storage layer: concrete key-value stores and the scope-routing adapter.

mod adapter;
mod file_store;
mod keys;
mod memory_store;

pub use adapter::StorageAdapter;
pub use file_store::FileStore;
pub use keys::{BACKUP_KEY, IDENTITY_MARKER_KEY, PRIMARY_KEY, SessionKeys};
pub use memory_store::MemoryStore;
