//! Application layer for Rehearse session continuity.
//!
//! Coordinates the domain types and the storage infrastructure into the
//! operations the interview UI calls: save, load, clear, recover and stats on
//! [`SessionStore`], periodic saving through [`AutoSaveScheduler`], and
//! identity-change cleanup through [`IdentityScopedCleaner`].

pub mod auto_save;
pub mod identity_cleaner;
pub mod session_store;

pub use auto_save::{AutoSaveHandle, AutoSaveScheduler};
pub use identity_cleaner::IdentityScopedCleaner;
pub use session_store::SessionStore;
