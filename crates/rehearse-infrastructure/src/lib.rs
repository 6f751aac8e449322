pub mod codec;
pub mod config_service;
pub mod migration;
pub mod paths;
pub mod storage;

pub use crate::codec::{EncodedSession, SessionCodec};
pub use crate::config_service::ConfigService;
pub use crate::migration::SessionMigrator;
pub use crate::storage::{FileStore, MemoryStore, SessionKeys, StorageAdapter};
