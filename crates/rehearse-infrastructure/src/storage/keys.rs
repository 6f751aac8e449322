//! Storage key layout.
//!
//! These names are a stable contract shared with every build that reads or
//! writes the stores.

use rehearse_core::identity::IdentityId;

/// Primary copy, session-scoped store.
pub const PRIMARY_KEY: &str = "rehearse.interview_session";

/// Backup copy, durable store.
pub const BACKUP_KEY: &str = "rehearse.interview_session.backup";

/// Last identity seen by this browser profile, durable store.
pub const IDENTITY_MARKER_KEY: &str = "rehearse.last_identity";

/// The pair of keys one session is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub primary: String,
    pub backup: String,
}

impl SessionKeys {
    /// Unscoped keys used before sessions were tied to an identity.
    pub fn legacy() -> Self {
        Self {
            primary: PRIMARY_KEY.to_string(),
            backup: BACKUP_KEY.to_string(),
        }
    }

    pub fn for_identity(identity: &IdentityId) -> Self {
        Self {
            primary: format!("{}:{}", PRIMARY_KEY, identity),
            backup: format!("{}:{}", BACKUP_KEY, identity),
        }
    }

    /// Identity-scoped keys when signed in, legacy keys otherwise.
    pub fn for_scope(identity: Option<&IdentityId>) -> Self {
        identity.map_or_else(Self::legacy, Self::for_identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_keys_differ_per_identity() {
        let a = SessionKeys::for_identity(&IdentityId::new("alice"));
        let b = SessionKeys::for_identity(&IdentityId::new("bob"));
        assert_ne!(a, b);
        assert_eq!(a.primary, "rehearse.interview_session:alice");
        assert_eq!(a.backup, "rehearse.interview_session.backup:alice");
    }

    #[test]
    fn test_anonymous_scope_uses_legacy_keys() {
        assert_eq!(SessionKeys::for_scope(None), SessionKeys::legacy());
    }
}
