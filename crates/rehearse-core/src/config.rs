//! Continuity configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::session::{DEFAULT_SESSION_TIMEOUT_MS, SessionTimeout};

fn default_session_timeout_ms() -> i64 {
    DEFAULT_SESSION_TIMEOUT_MS
}

fn default_auto_save_interval_ms() -> u64 {
    30_000
}

/// Tunables for session continuity.
///
/// Every field has a default, so an empty `config.toml` is valid.
///
/// ```toml
/// session_timeout_ms = 7200000
/// auto_save_interval_ms = 30000
/// storage_dir = "/var/lib/rehearse"
/// durable_quota_bytes = 5242880
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityConfig {
    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: i64,
    #[serde(default = "default_auto_save_interval_ms")]
    pub auto_save_interval_ms: u64,
    /// Directory of the durable store. Resolved from the platform data
    /// directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durable_quota_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_quota_bytes: Option<usize>,
}

impl Default for ContinuityConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: default_session_timeout_ms(),
            auto_save_interval_ms: default_auto_save_interval_ms(),
            storage_dir: None,
            durable_quota_bytes: None,
            session_quota_bytes: None,
        }
    }
}

impl ContinuityConfig {
    /// Parses a TOML document. Blank input yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    pub fn session_timeout(&self) -> SessionTimeout {
        SessionTimeout::from_millis(self.session_timeout_ms)
    }

    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_millis(self.auto_save_interval_ms)
    }
}
