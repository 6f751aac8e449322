pub mod config;
pub mod inspect;
pub mod purge;
pub mod upgrade;

use anyhow::{Context, Result};
use rehearse_application::SessionStore;
use rehearse_core::config::ContinuityConfig;
use rehearse_core::identity::IdentityId;
use rehearse_infrastructure::{ConfigService, StorageAdapter};
use std::path::PathBuf;

/// Configuration and storage shared by every command.
///
/// The session-scoped store is empty in a fresh process, so commands see
/// what a newly opened tab would: the durable backup only.
pub struct CommandContext {
    pub config_path: PathBuf,
    pub config: ContinuityConfig,
    pub storage_dir: PathBuf,
    adapter: StorageAdapter,
}

impl CommandContext {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::new(path),
            None => ConfigService::default_location()?,
        };
        let config = service
            .load()
            .with_context(|| format!("Failed to load config from {}", service.path().display()))?;
        let storage_dir = ConfigService::storage_dir(&config)?;
        let adapter = StorageAdapter::from_config(&config, storage_dir.clone());

        Ok(Self {
            config_path: service.path().to_path_buf(),
            config,
            storage_dir,
            adapter,
        })
    }

    pub fn adapter(&self) -> StorageAdapter {
        self.adapter.clone()
    }

    pub fn store(&self, identity: Option<&IdentityId>) -> SessionStore {
        let store = SessionStore::from_config(self.adapter(), &self.config);
        match identity {
            Some(identity) => store.with_identity(identity),
            None => store,
        }
    }
}
