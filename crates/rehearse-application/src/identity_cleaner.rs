//! Purges session data belonging to a previous identity.

use rehearse_core::identity::{IdentityId, IdentityTransition};
use rehearse_core::storage::StorageScope;
use rehearse_infrastructure::storage::{IDENTITY_MARKER_KEY, SessionKeys, StorageAdapter};

/// Keeps one profile's interview content away from the next identity that
/// signs in on it.
///
/// Driven by the identity provider's events. Every operation is idempotent
/// and infallible from the caller's point of view: storage errors are logged
/// and swallowed so that the sign-in or sign-out flow is never blocked.
#[derive(Clone)]
pub struct IdentityScopedCleaner {
    adapter: StorageAdapter,
}

impl IdentityScopedCleaner {
    pub fn new(adapter: StorageAdapter) -> Self {
        Self { adapter }
    }

    /// Handles a sign-in.
    ///
    /// Reads the remembered identity; when one exists and differs from
    /// `current`, that identity's sessions are purged. `current` is then
    /// remembered.
    pub async fn on_identity_established(&self, current: &IdentityId) {
        let previous = self.remembered_identity().await;
        self.establish(previous.as_ref(), current).await;
    }

    /// Handles a sign-out: purges `identity`'s sessions and forgets it.
    pub async fn on_signed_out(&self, identity: &IdentityId) {
        self.purge(identity).await;
        if let Err(e) = self
            .adapter
            .remove(StorageScope::Durable, IDENTITY_MARKER_KEY)
            .await
        {
            tracing::error!("Failed to clear remembered identity: {}", e);
        }
    }

    /// Handles a transition reported explicitly by the identity provider.
    ///
    /// A previous identity carried by the event takes precedence; without
    /// one, the remembered marker is consulted as in
    /// [`Self::on_identity_established`].
    pub async fn handle(&self, transition: &IdentityTransition) {
        match transition {
            IdentityTransition::Established {
                previous: Some(previous),
                current,
            } => self.establish(Some(previous), current).await,
            IdentityTransition::Established {
                previous: None,
                current,
            } => self.on_identity_established(current).await,
            IdentityTransition::SignedOut { identity } => self.on_signed_out(identity).await,
        }
    }

    /// The identity last seen on this profile, if any.
    pub async fn remembered_identity(&self) -> Option<IdentityId> {
        match self
            .adapter
            .read(StorageScope::Durable, IDENTITY_MARKER_KEY)
            .await
        {
            Ok(marker) => marker
                .filter(|id| !id.is_empty())
                .map(IdentityId::new),
            Err(e) => {
                tracing::warn!("Cannot read remembered identity: {}", e);
                None
            }
        }
    }

    /// Removes every session key `identity` may own: the identity-scoped
    /// pair and the unscoped legacy pair, in both stores.
    pub async fn purge(&self, identity: &IdentityId) {
        let mut failures = 0usize;
        for keys in [SessionKeys::for_identity(identity), SessionKeys::legacy()] {
            for key in [&keys.primary, &keys.backup] {
                for scope in [StorageScope::Session, StorageScope::Durable] {
                    if let Err(e) = self.adapter.remove(scope, key).await {
                        failures += 1;
                        tracing::error!("Failed to purge {} ({} scope): {}", key, scope, e);
                    }
                }
            }
        }

        if failures == 0 {
            tracing::info!("Purged session data for identity {}", identity);
        } else {
            tracing::warn!(
                "Purged session data for identity {} with {} failures",
                identity,
                failures
            );
        }
    }

    async fn establish(&self, previous: Option<&IdentityId>, current: &IdentityId) {
        match previous {
            Some(previous) if previous != current => {
                tracing::info!("Identity changed; purging sessions of previous identity");
                self.purge(previous).await;
            }
            Some(_) => tracing::debug!("Same identity re-established; nothing to purge"),
            None => tracing::debug!("No previous identity remembered"),
        }

        if let Err(e) = self
            .adapter
            .write(StorageScope::Durable, IDENTITY_MARKER_KEY, current.as_str())
            .await
        {
            tracing::error!("Failed to remember identity: {}", e);
        }
    }
}
