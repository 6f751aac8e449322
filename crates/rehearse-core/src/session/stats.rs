//! Read-only summary of the current session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::InterviewSession;

/// Snapshot statistics about the stored session.
///
/// `Default` is the "no session" value: nothing active, everything zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub has_active_session: bool,
    /// Milliseconds since `start_time`
    pub session_age_ms: i64,
    pub question_count: usize,
    /// Percentage of the configured question count reached so far
    pub completion_rate: f64,
}

impl SessionStats {
    pub fn from_session(session: &InterviewSession, now: DateTime<Utc>) -> Self {
        let question_count = session.questions.len();
        let target = session.settings.question_count;
        let completion_rate = if target == 0 {
            0.0
        } else {
            100.0 * question_count as f64 / f64::from(target)
        };

        Self {
            has_active_session: true,
            session_age_ms: (now - session.start_time).num_milliseconds().max(0),
            question_count,
            completion_rate,
        }
    }
}
