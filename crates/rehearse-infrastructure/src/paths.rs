//! Unified path management for Rehearse files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/rehearse/          # Config directory
//! └── config.toml              # Continuity configuration
//!
//! ~/.local/share/rehearse/     # Data directory
//! └── storage/                 # Durable key-value store (FileStore)
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "rehearse";

/// Platform-appropriate locations (XDG on Linux, the native equivalents on
/// macOS and Windows).
pub struct RehearsePaths;

impl RehearsePaths {
    /// Returns the configuration directory, e.g. `~/.config/rehearse/`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory, e.g. `~/.local/share/rehearse/`.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default directory of the durable store.
    pub fn storage_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("storage"))
    }
}
