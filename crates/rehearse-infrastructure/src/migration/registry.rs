//! Ordered chain of schema upgrade steps.
//!
//! A record is always walked through every step between its tag and the
//! current version; steps are never skipped or combined.

use super::traits::{MigrationChain, TypedMigration};
use anyhow::{Context, Result, bail};
use semver::Version;
use std::sync::Arc;

type Step<T> = Arc<dyn TypedMigration<T, T>>;

/// Upgrade steps for one record type, ordered oldest first.
///
/// Registration checks that each step starts where the previous one ended,
/// so the steps always form one unbroken path up to `latest`:
///
/// ```ignore
/// let mut registry = MigrationRegistry::new(Version::new(3, 0, 0));
/// registry.register(Arc::new(LegacyToV2Migration)); // 1.0 -> 2.0
/// registry.register(Arc::new(V2ToV3Migration));     // 2.0 -> 3.0
///
/// let current = registry.migrate_to_latest(record, &Version::new(1, 0, 0))?;
/// ```
#[derive(Debug)]
pub struct MigrationRegistry<T> {
    steps: Vec<Step<T>>,
    latest: Version,
}

impl<T> MigrationRegistry<T> {
    pub fn new(latest: Version) -> Self {
        Self {
            steps: Vec::new(),
            latest,
        }
    }

    /// Appends a step to the chain.
    ///
    /// # Panics
    ///
    /// When the step does not start at the previous step's target, or
    /// targets a version past `latest`. Both indicate a miswired registry.
    pub fn register(&mut self, step: Step<T>) {
        if let Some(previous) = self.steps.last() {
            assert!(
                previous.to_version() == step.from_version(),
                "Migration chain broken: '{}' ends at {} but '{}' starts at {}",
                previous.description(),
                previous.to_version(),
                step.description(),
                step.from_version()
            );
        }
        assert!(
            step.to_version() <= self.latest,
            "Migration '{}' targets {} which exceeds registry's latest version {}",
            step.description(),
            step.to_version(),
            self.latest
        );
        self.steps.push(step);
    }

    pub fn register_all(&mut self, steps: impl IntoIterator<Item = Step<T>>) {
        for step in steps {
            self.register(step);
        }
    }

    pub fn latest_version(&self) -> &Version {
        &self.latest
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps a record tagged `version` still has to go through.
    ///
    /// Empty for a current record. A tag older than the first step is
    /// treated as that step's source version, so it runs the whole chain.
    fn pending(&self, version: &Version) -> Result<&[Step<T>]> {
        if version > &self.latest {
            bail!(
                "record version {} is newer than the latest supported version {}",
                version,
                self.latest
            );
        }
        if version == &self.latest {
            return Ok(&[]);
        }
        match self.steps.iter().position(|s| s.applies_to(version)) {
            Some(first) => Ok(&self.steps[first..]),
            None => bail!("no upgrade path from {} to {}", version, self.latest),
        }
    }
}

impl<T> MigrationChain<T> for MigrationRegistry<T> {
    fn migrate_to_latest(&self, data: T, current_version: &Version) -> Result<T> {
        let pending = self.pending(current_version)?;
        if pending.is_empty() {
            tracing::debug!("Record already at {}", current_version);
            return Ok(data);
        }

        tracing::info!(
            "Upgrading record {} -> {} ({} steps)",
            current_version,
            self.latest,
            pending.len()
        );

        pending.iter().try_fold(data, |record, step| {
            tracing::info!(
                "  {} -> {}: {}",
                step.from_version(),
                step.to_version(),
                step.description()
            );
            step.migrate(record).with_context(|| {
                format!(
                    "upgrade step {} -> {} failed",
                    step.from_version(),
                    step.to_version()
                )
            })
        })
    }

    fn available_paths(&self, from: &Version) -> Vec<Vec<Version>> {
        match self.pending(from) {
            Ok(pending) if !pending.is_empty() => {
                let mut path = vec![from.clone()];
                path.extend(pending.iter().map(|s| s.to_version()));
                vec![path]
            }
            _ => Vec::new(),
        }
    }
}
