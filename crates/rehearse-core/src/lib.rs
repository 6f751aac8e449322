pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod notification;
pub mod session;
pub mod storage;

// Re-export common types
pub use clock::{Clock, SystemClock};
pub use config::ContinuityConfig;
pub use error::{RehearseError, Result};
pub use identity::{IdentityId, IdentityTransition};
pub use notification::{TracingNotifier, UserNotifier};
pub use storage::{KeyValueStore, StorageScope};
