//! Schema version tags.
//!
//! Records carry short tags such as `"2.0"`; they are compared as semantic
//! versions so that `"10.0"` sorts after `"9.0"`. A missing tag denotes the
//! legacy (pre-2.0) record shape.

use anyhow::{Context, Result};
use semver::Version;

/// The schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: &str = "3.0";

/// The version assumed for records without a `schemaVersion` tag.
pub const LEGACY_SCHEMA_VERSION: &str = "1.0";

/// Parses a schema tag, padding missing minor/patch components with zero.
///
/// `"2"`, `"2.0"` and `"2.0.0"` are the same version.
pub fn parse_schema_version(tag: &str) -> Result<Version> {
    let trimmed = tag.trim();
    let padded = match trimmed.split('.').count() {
        1 => format!("{}.0.0", trimmed),
        2 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).with_context(|| format!("invalid schema version tag '{}'", tag))
}

/// Resolves the version of a record, treating an absent tag as legacy.
pub fn record_version(tag: Option<&str>) -> Result<Version> {
    parse_schema_version(tag.unwrap_or(LEGACY_SCHEMA_VERSION))
}

/// Formats a version as the short tag stored in records.
pub fn schema_tag(version: &Version) -> String {
    if version.patch == 0 && version.pre.is_empty() {
        format!("{}.{}", version.major, version.minor)
    } else {
        version.to_string()
    }
}

pub fn current_version() -> Version {
    Version::new(3, 0, 0)
}
