//! Abstractions for schema upgrade steps.

use anyhow::Result;
use semver::Version;

/// Version metadata of one upgrade step.
pub trait Migration: Send + Sync {
    /// Schema version the step expects.
    fn from_version(&self) -> Version;

    /// Schema version the step produces.
    fn to_version(&self) -> Version;

    /// Whether a record tagged `version` still needs this step.
    ///
    /// True for anything older than the target, including intermediate tags
    /// that no step declares.
    fn applies_to(&self, version: &Version) -> bool {
        version < &self.to_version()
    }

    /// Short label for logs.
    fn description(&self) -> &str;
}

/// An upgrade step over concrete record types.
///
/// A step only adds what the source record lacks; fields already present
/// are carried over unchanged.
pub trait TypedMigration<From, To>: Migration + std::fmt::Debug {
    fn migrate(&self, from: From) -> Result<To>;
}

/// Something that can bring a record of type `T` up to its latest schema.
pub trait MigrationChain<T> {
    /// Runs every step between `current_version` and the latest version.
    ///
    /// # Errors
    ///
    /// When the record is newer than the latest version, no step covers
    /// its version, or a step fails.
    fn migrate_to_latest(&self, data: T, current_version: &Version) -> Result<T>;

    /// Versions visited when upgrading from `from`; empty when there is
    /// nothing to do or no path exists.
    fn available_paths(&self, from: &Version) -> Vec<Vec<Version>>;
}
