//! Session time-to-live.

use chrono::{DateTime, Duration, Utc};

use super::model::InterviewSession;

/// Two hours.
pub const DEFAULT_SESSION_TIMEOUT_MS: i64 = 2 * 60 * 60 * 1000;

/// Maximum idle age after which a stored session is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeout(Duration);

impl SessionTimeout {
    pub fn from_millis(ms: i64) -> Self {
        Self(Duration::milliseconds(ms))
    }

    pub fn as_millis(&self) -> i64 {
        self.0.num_milliseconds()
    }

    /// Age of the session relative to `now`, measured from `last_updated`
    /// (or `start_time` when never saved).
    pub fn age(&self, session: &InterviewSession, now: DateTime<Utc>) -> Duration {
        now - session.activity_time()
    }

    /// A session exactly at the limit is still live; one millisecond past it
    /// is expired.
    pub fn is_expired(&self, session: &InterviewSession, now: DateTime<Utc>) -> bool {
        self.age(session, now) > self.0
    }
}

impl Default for SessionTimeout {
    fn default() -> Self {
        Self::from_millis(DEFAULT_SESSION_TIMEOUT_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InterviewSettings;
    use chrono::TimeZone;

    fn session_updated_at(at: DateTime<Utc>) -> InterviewSession {
        let mut s = InterviewSession::new(
            InterviewSettings::new("media", "mixed", 4),
            at - Duration::minutes(30),
        );
        s.last_updated = Some(at);
        s
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let timeout = SessionTimeout::default();
        assert_eq!(timeout.as_millis(), 7_200_000);

        let just_expired =
            session_updated_at(now - Duration::hours(2) - Duration::milliseconds(1));
        let just_live = session_updated_at(now - Duration::hours(2) + Duration::milliseconds(1));
        let exactly = session_updated_at(now - Duration::hours(2));

        assert!(timeout.is_expired(&just_expired, now));
        assert!(!timeout.is_expired(&just_live, now));
        assert!(!timeout.is_expired(&exactly, now));
    }

    #[test]
    fn test_falls_back_to_start_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let s = InterviewSession::new(
            InterviewSettings::new("media", "mixed", 4),
            now - Duration::hours(3),
        );
        assert!(SessionTimeout::default().is_expired(&s, now));
    }
}
