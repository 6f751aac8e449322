//! Loading of `ContinuityConfig` from disk.

use rehearse_core::config::ContinuityConfig;
use rehearse_core::error::{RehearseError, Result};
use std::path::{Path, PathBuf};

use crate::paths::RehearsePaths;

/// Reads the continuity configuration file.
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `~/.config/rehearse/config.toml`.
    pub fn default_location() -> Result<Self> {
        let path = RehearsePaths::config_file().map_err(|e| RehearseError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed TOML and `Io` when the file exists but
    /// cannot be read.
    pub fn load(&self) -> Result<ContinuityConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", self.path);
            return Ok(ContinuityConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        ContinuityConfig::from_toml_str(&content)
    }

    /// Resolves the durable store directory: the configured one, or the
    /// platform default.
    pub fn storage_dir(config: &ContinuityConfig) -> Result<PathBuf> {
        match &config.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => RehearsePaths::storage_dir().map_err(|e| RehearseError::config(e.to_string())),
        }
    }
}
