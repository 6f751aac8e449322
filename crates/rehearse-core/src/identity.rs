//! Authenticated identity values handed in by the identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IdentityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An identity change reported by the identity provider.
///
/// The provider passes the previous identity explicitly when it knows it;
/// the cleaner only consults the remembered marker when `previous` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityTransition {
    Established {
        previous: Option<IdentityId>,
        current: IdentityId,
    },
    SignedOut {
        identity: IdentityId,
    },
}
