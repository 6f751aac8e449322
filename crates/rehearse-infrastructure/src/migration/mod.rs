//! Schema migration framework for persisted interview sessions.
//!
//! This module provides a linear migration chain for evolving the session
//! record over time. The framework ensures that:
//!
//! - All migrations are executed in order (no skipping)
//! - A step only adds what the record lacks, so upgrades preserve data
//! - Upgrading a current record is a no-op, so upgrades are idempotent
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               SessionMigrator                 │
//! │   upgrade(record) -> record   (pure)          │
//! ├──────────────────────────────────────────────┤
//! │   MigrationRegistry<InterviewSession>         │
//! │   1.0 (untagged) → 2.0 → 3.0                  │
//! └──────────────────────────────────────────────┘
//!          │                    │
//!          V                    V
//!   LegacyToV2Migration   V2ToV3Migration
//! ```
//!
//! Persistence of an upgraded record is a separate step owned by the session
//! store, so migrations are testable without any storage.
//!
//! # Adding a New Schema Version
//!
//! 1. Add the new optional fields to `InterviewSession`
//! 2. Implement a `V3ToV4Migration` in `session.rs` filling their defaults
//! 3. Register it in `build_session_registry()` and bump
//!    `CURRENT_SCHEMA_VERSION` / `current_version()`
//!
//! The registry panics at construction if the chain is broken.

mod registry;
mod session;
mod traits;
mod version;

// Public API
pub use registry::MigrationRegistry;
pub use session::{LegacyToV2Migration, V2ToV3Migration};
pub use traits::{Migration, MigrationChain, TypedMigration};
pub use version::{
    CURRENT_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION, current_version, parse_schema_version,
    record_version, schema_tag,
};

use rehearse_core::error::Result;
use rehearse_core::session::InterviewSession;
use std::sync::Arc;

/// Builds the session registry with every known migration.
pub fn build_session_registry() -> MigrationRegistry<InterviewSession> {
    let mut registry = MigrationRegistry::new(current_version());
    registry.register(Arc::new(LegacyToV2Migration));
    registry.register(Arc::new(V2ToV3Migration));
    registry
}

/// Brings session records up to the current schema.
#[derive(Debug)]
pub struct SessionMigrator {
    registry: MigrationRegistry<InterviewSession>,
}

impl SessionMigrator {
    pub fn new() -> Self {
        Self {
            registry: build_session_registry(),
        }
    }

    /// Returns true when `session` is tagged older than the current schema.
    ///
    /// # Errors
    ///
    /// Returns `UpgradeFailed` when the tag cannot be parsed.
    pub fn needs_upgrade(&self, session: &InterviewSession) -> Result<bool> {
        let version = record_version(session.schema_version.as_deref())?;
        Ok(&version < self.registry.latest_version())
    }

    /// Returns `session` upgraded to the current schema.
    ///
    /// Pure: no storage is touched. Fields the record already has are kept;
    /// missing version-specific fields get their defaults and the tag is set
    /// to the current version. A current record is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `UpgradeFailed` for unparseable tags, records newer than this
    /// build, or a failing step.
    pub fn upgrade(&self, session: InterviewSession) -> Result<InterviewSession> {
        let version = record_version(session.schema_version.as_deref())?;
        let mut upgraded = self.registry.migrate_to_latest(session, &version)?;
        if &version < self.registry.latest_version() {
            upgraded.schema_version = Some(CURRENT_SCHEMA_VERSION.to_string());
        }
        Ok(upgraded)
    }
}

impl Default for SessionMigrator {
    fn default() -> Self {
        Self::new()
    }
}
