//! User-facing notifications raised by the continuity layer.

use crate::error::RehearseError;

/// Receives warnings that must be shown to the user.
///
/// Only storage capacity failures are routed here: they mean that progress
/// made from now on may not survive a reload.
pub trait UserNotifier: Send + Sync {
    fn storage_full(&self, error: &RehearseError);
}

/// Notifier that only logs. Used when no UI hook is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn storage_full(&self, error: &RehearseError) {
        tracing::warn!(
            target: "rehearse::notify",
            "Storage is full; interview progress may not be saved: {}",
            error
        );
    }
}
