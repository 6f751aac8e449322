//! Time source abstraction.

use chrono::{DateTime, Utc};

/// Supplies the current instant.
///
/// Expiry and statistics read time through this seam so they can be checked
/// at exact millisecond boundaries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
