//! Error types for the Rehearse session-continuity layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Rehearse workspace.
///
/// Storage, decoding and migration failures are all expressed here so the
/// session store can decide, per variant, whether to swallow, log, notify or
/// purge. None of these are meant to reach the UI as an unhandled fault.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RehearseError {
    /// The backing store cannot be read or written at all
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A write was rejected for capacity reasons
    #[error("Storage quota exceeded writing '{key}': {message}")]
    StorageQuotaExceeded { key: String, message: String },

    /// Stored bytes do not parse as a session record
    #[error("Decode error: {0}")]
    Decode(String),

    /// A valid record that is past its time-to-live
    #[error("Session expired ({age_ms} ms old, limit {timeout_ms} ms)")]
    ExpiredSession { age_ms: i64, timeout_ms: i64 },

    /// A record could not be brought up to the current schema
    #[error("Upgrade failed: {0}")]
    UpgradeFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization error outside of session decoding
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RehearseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a StorageUnavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// Creates a StorageQuotaExceeded error
    pub fn quota_exceeded(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageQuotaExceeded {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates an UpgradeFailed error
    pub fn upgrade_failed(message: impl Into<String>) -> Self {
        Self::UpgradeFailed(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a quota error.
    ///
    /// Quota errors are the only kind that must be surfaced to the user,
    /// because they mean later saves will silently lose data.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::StorageQuotaExceeded { .. })
    }

    /// Check if the backing store is unavailable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if this is an expiry outcome
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::ExpiredSession { .. })
    }

    /// Check if this is an upgrade failure
    pub fn is_upgrade_failed(&self) -> bool {
        matches!(self, Self::UpgradeFailed(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RehearseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RehearseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RehearseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for RehearseError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<semver::Error> for RehearseError {
    fn from(err: semver::Error) -> Self {
        Self::UpgradeFailed(format!("invalid schema version: {}", err))
    }
}

/// Conversion from anyhow::Error, used where the migration chain reports
/// context-rich failures.
impl From<anyhow::Error> for RehearseError {
    fn from(err: anyhow::Error) -> Self {
        Self::UpgradeFailed(format!("{:#}", err))
    }
}

/// A type alias for `Result<T, RehearseError>`.
pub type Result<T> = std::result::Result<T, RehearseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_is_distinct_kind() {
        let err = RehearseError::quota_exceeded("rehearse.interview_session", "limit 10 bytes");
        assert!(err.is_quota_exceeded());
        assert!(!err.is_unavailable());
        assert!(err.to_string().contains("rehearse.interview_session"));
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RehearseError = io.into();
        match err {
            RehearseError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_anyhow_maps_to_upgrade_failed() {
        let err: RehearseError = anyhow::anyhow!("step 2 broke").into();
        assert!(err.is_upgrade_failed());
    }
}
