//! Session continuity: save, load, expire, upgrade and recover the current
//! interview session.

use rehearse_core::clock::{Clock, SystemClock};
use rehearse_core::config::ContinuityConfig;
use rehearse_core::error::{RehearseError, Result};
use rehearse_core::identity::IdentityId;
use rehearse_core::notification::{TracingNotifier, UserNotifier};
use rehearse_core::session::{InterviewSession, SessionStats, SessionTimeout};
use rehearse_core::storage::StorageScope;
use rehearse_infrastructure::codec::SessionCodec;
use rehearse_infrastructure::migration::SessionMigrator;
use rehearse_infrastructure::storage::{SessionKeys, StorageAdapter};
use std::sync::Arc;

/// Keeps one logical interview session alive across reloads.
///
/// `SessionStore` is responsible for:
/// - Writing the session to the session-scoped store (primary) and mirroring
///   it to the durable store (backup)
/// - Falling back to the backup when the primary is gone, and healing the
///   primary from it
/// - Upgrading older records and writing them back in the current shape
/// - Discarding expired and corrupt records
///
/// Failures never escape as faults: reads degrade to "no session", and
/// saves report an error the caller may ignore. Capacity failures are also
/// routed to the [`UserNotifier`].
pub struct SessionStore {
    adapter: StorageAdapter,
    keys: SessionKeys,
    codec: SessionCodec,
    migrator: SessionMigrator,
    timeout: SessionTimeout,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn UserNotifier>,
}

impl SessionStore {
    /// Creates a store over `adapter` using the unscoped keys, the wall
    /// clock, the default two-hour timeout and a logging notifier.
    pub fn new(adapter: StorageAdapter) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            adapter,
            keys: SessionKeys::legacy(),
            codec: SessionCodec::new(clock.clone()),
            migrator: SessionMigrator::new(),
            timeout: SessionTimeout::default(),
            clock,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn from_config(adapter: StorageAdapter, config: &ContinuityConfig) -> Self {
        Self::new(adapter).with_timeout(config.session_timeout())
    }

    /// Scopes every key to `identity`.
    pub fn with_identity(mut self, identity: &IdentityId) -> Self {
        self.keys = SessionKeys::for_identity(identity);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.codec = SessionCodec::new(clock.clone());
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_timeout(mut self, timeout: SessionTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Persists `session`, replacing whatever was stored.
    ///
    /// The record is upgraded to the current schema if needed, stamped, and
    /// written to the primary key; only after that succeeds is the same
    /// payload mirrored to the backup key. A failed backup write does not
    /// roll back the primary.
    ///
    /// # Returns
    ///
    /// The session exactly as written (current schema tag, fresh
    /// `last_updated`).
    ///
    /// # Errors
    ///
    /// Returns the storage or encoding error. The error has already been
    /// logged, and capacity errors have been shown to the user; callers can
    /// ignore it since the in-memory session stays authoritative.
    pub async fn save(&self, session: &InterviewSession) -> Result<InterviewSession> {
        let record = self.migrator.upgrade(session.clone()).inspect_err(|e| {
            tracing::warn!("Not saving session that cannot be upgraded: {}", e);
        })?;

        let encoded = self.codec.encode(&record).inspect_err(|e| {
            tracing::warn!("Not saving session: {}", e);
        })?;

        self.adapter
            .write(StorageScope::Session, &self.keys.primary, &encoded.payload)
            .await
            .inspect_err(|e| self.report_write_failure("primary", e))?;

        self.adapter
            .write(StorageScope::Durable, &self.keys.backup, &encoded.payload)
            .await
            .inspect_err(|e| self.report_write_failure("backup", e))?;

        tracing::debug!(
            "Saved session ({} questions) under {}",
            encoded.session.questions.len(),
            self.keys.primary
        );
        Ok(encoded.session)
    }

    /// Loads the session to resume, if any.
    ///
    /// Reads the primary copy, falling back to the backup (which is then
    /// copied back to the primary). The record is upgraded, checked for
    /// expiry, and written back if the upgrade changed its shape.
    ///
    /// Returns `None` when nothing is stored, the record is corrupt (it is
    /// deleted), expired (both copies are deleted), completed, or cannot be
    /// upgraded.
    pub async fn load(&self) -> Option<InterviewSession> {
        let stored = self.read_with_fallback().await?;

        if stored.is_completed {
            tracing::debug!("Stored session is completed; nothing to resume");
            return None;
        }

        let needs_upgrade = match self.migrator.needs_upgrade(&stored) {
            Ok(needs) => needs,
            Err(e) => {
                tracing::warn!("Ignoring stored session: {}", e);
                return None;
            }
        };

        let session = match self.migrator.upgrade(stored) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring stored session: {}", e);
                return None;
            }
        };

        let now = self.clock.now();
        if self.timeout.is_expired(&session, now) {
            let err = RehearseError::ExpiredSession {
                age_ms: self.timeout.age(&session, now).num_milliseconds(),
                timeout_ms: self.timeout.as_millis(),
            };
            tracing::info!("Discarding stored session: {}", err);
            self.clear().await;
            return None;
        }

        if needs_upgrade {
            tracing::info!("Writing back session upgraded to the current schema");
            if let Ok(written) = self.save(&session).await {
                return Some(written);
            }
        }

        Some(session)
    }

    /// Removes both copies. Safe to call when nothing is stored.
    pub async fn clear(&self) {
        if let Err(e) = self
            .adapter
            .remove(StorageScope::Session, &self.keys.primary)
            .await
        {
            tracing::warn!("Failed to remove primary session copy: {}", e);
        }
        if let Err(e) = self
            .adapter
            .remove(StorageScope::Durable, &self.keys.backup)
            .await
        {
            tracing::warn!("Failed to remove backup session copy: {}", e);
        }
        tracing::debug!("Cleared session under {}", self.keys.primary);
    }

    /// Restores the primary copy from the backup.
    ///
    /// Meant for when the primary store is suspected to be corrupt. The
    /// backup payload is copied verbatim (no upgrade); an expired backup is
    /// discarded instead.
    pub async fn recover(&self) -> Option<InterviewSession> {
        let payload = match self
            .adapter
            .read(StorageScope::Durable, &self.keys.backup)
            .await
        {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                tracing::debug!("No backup to recover from");
                return None;
            }
            Err(e) => {
                tracing::warn!("Cannot read backup: {}", e);
                return None;
            }
        };

        let session = match self.codec.decode(&payload) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Deleting corrupt backup: {}", e);
                self.remove_quietly(StorageScope::Durable, &self.keys.backup)
                    .await;
                return None;
            }
        };

        if self.timeout.is_expired(&session, self.clock.now()) {
            tracing::info!("Backup session has expired; discarding");
            self.clear().await;
            return None;
        }

        if let Err(e) = self
            .adapter
            .write(StorageScope::Session, &self.keys.primary, &payload)
            .await
        {
            self.report_write_failure("primary", &e);
        }

        tracing::info!("Recovered session from backup");
        Some(session)
    }

    /// Summarizes the stored session without modifying storage.
    ///
    /// Returns the zeroed stats when no resumable session is stored.
    pub async fn stats(&self) -> SessionStats {
        let now = self.clock.now();
        match self.peek().await {
            Some(session) if !self.timeout.is_expired(&session, now) => {
                SessionStats::from_session(&session, now)
            }
            _ => SessionStats::default(),
        }
    }

    /// Side-effect-free read: primary, else backup, upgraded in memory.
    async fn peek(&self) -> Option<InterviewSession> {
        let slots = [
            (StorageScope::Session, &self.keys.primary),
            (StorageScope::Durable, &self.keys.backup),
        ];
        for (scope, key) in slots {
            let Ok(Some(payload)) = self.adapter.read(scope, key).await else {
                continue;
            };
            let Ok(session) = self.codec.decode(&payload) else {
                continue;
            };
            if session.is_completed {
                return None;
            }
            return self.migrator.upgrade(session).ok();
        }
        None
    }

    /// Reads the primary copy, falling back to the backup.
    ///
    /// Corrupt copies are deleted. A backup hit is copied to the primary so
    /// the next load is served from there.
    async fn read_with_fallback(&self) -> Option<InterviewSession> {
        match self
            .adapter
            .read(StorageScope::Session, &self.keys.primary)
            .await
        {
            Ok(Some(payload)) => match self.codec.decode(&payload) {
                Ok(session) => return Some(session),
                Err(e) => {
                    tracing::warn!("Deleting corrupt primary session copy: {}", e);
                    self.remove_quietly(StorageScope::Session, &self.keys.primary)
                        .await;
                }
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Cannot read primary session copy: {}", e),
        }

        let payload = match self
            .adapter
            .read(StorageScope::Durable, &self.keys.backup)
            .await
        {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cannot read backup session copy: {}", e);
                return None;
            }
        };

        let session = match self.codec.decode(&payload) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Deleting corrupt backup session copy: {}", e);
                self.remove_quietly(StorageScope::Durable, &self.keys.backup)
                    .await;
                return None;
            }
        };

        tracing::info!("Primary session copy missing; recovered from backup");
        if let Err(e) = self
            .adapter
            .write(StorageScope::Session, &self.keys.primary, &payload)
            .await
        {
            self.report_write_failure("primary", &e);
        }
        Some(session)
    }

    async fn remove_quietly(&self, scope: StorageScope, key: &str) {
        if let Err(e) = self.adapter.remove(scope, key).await {
            tracing::warn!("Failed to remove {} ({} scope): {}", key, scope, e);
        }
    }

    fn report_write_failure(&self, copy: &str, err: &RehearseError) {
        if err.is_quota_exceeded() {
            tracing::warn!("Storage full while writing {} session copy: {}", copy, err);
            self.notifier.storage_full(err);
        } else {
            tracing::warn!("Failed to write {} session copy: {}", copy, err);
        }
    }
}
