//! Session record encoding.
//!
//! Records are stored as JSON with camelCase keys so that stores written by
//! the browser build and by this crate are interchangeable.

use rehearse_core::clock::Clock;
use rehearse_core::error::{RehearseError, Result};
use rehearse_core::session::InterviewSession;
use std::sync::Arc;

use crate::migration::CURRENT_SCHEMA_VERSION;

/// An encoded record together with the stamped session it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSession {
    /// The session as written: current schema tag and fresh `last_updated`
    pub session: InterviewSession,
    /// Serialized form handed to storage
    pub payload: String,
}

/// Serializes and parses session records.
pub struct SessionCodec {
    clock: Arc<dyn Clock>,
}

impl SessionCodec {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Stamps the current schema tag and a fresh `last_updated`, then
    /// serializes.
    ///
    /// `last_updated` never moves backwards: it is clamped to be at least
    /// `start_time` and the previously stamped value.
    ///
    /// # Errors
    ///
    /// Returns `Internal` for a record that breaks its structural invariants;
    /// such a record is never written.
    pub fn encode(&self, session: &InterviewSession) -> Result<EncodedSession> {
        let mut stamped = session.clone();

        let mut last_updated = self.clock.now().max(stamped.start_time);
        if let Some(previous) = stamped.last_updated {
            last_updated = last_updated.max(previous);
        }
        stamped.last_updated = Some(last_updated);
        stamped.schema_version = Some(CURRENT_SCHEMA_VERSION.to_string());

        stamped.validate().map_err(|e| {
            RehearseError::internal(format!("refusing to persist invalid session: {}", e))
        })?;

        let payload = serde_json::to_string(&stamped)?;
        Ok(EncodedSession {
            session: stamped,
            payload,
        })
    }

    /// Parses a stored payload.
    ///
    /// The record is returned as stored; upgrading is a separate step.
    ///
    /// # Errors
    ///
    /// Returns `Decode` for malformed JSON, missing required fields or a
    /// record that breaks its structural invariants.
    pub fn decode(&self, payload: &str) -> Result<InterviewSession> {
        let session: InterviewSession = serde_json::from_str(payload)
            .map_err(|e| RehearseError::decode(format!("malformed session record: {}", e)))?;
        session.validate()?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rehearse_core::session::{InterviewSettings, QuestionRecord};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 15, 30, 0).unwrap()
    }

    fn codec() -> SessionCodec {
        SessionCodec::new(Arc::new(FixedClock(now())))
    }

    fn session() -> InterviewSession {
        let mut s = InterviewSession::new(
            InterviewSettings::new("aerospace", "technical", 5),
            now() - Duration::minutes(20),
        );
        let mut q = QuestionRecord::new("q1", "Explain a design trade-off").with_topic("design");
        q.asked_at = Some(now() - Duration::minutes(19));
        s.push_question(q);
        s.record_answer("Latency over throughput", now() - Duration::minutes(17))
            .unwrap();
        s.push_question(QuestionRecord::new("q2", "Walk me through a rollout"));
        s
    }

    #[test]
    fn test_round_trip_only_refreshes_stamps() {
        let original = session();
        let codec = codec();

        let encoded = codec.encode(&original).unwrap();
        let decoded = codec.decode(&encoded.payload).unwrap();

        assert_eq!(decoded.last_updated, Some(now()));
        assert_eq!(decoded.schema_version.as_deref(), Some(CURRENT_SCHEMA_VERSION));

        let mut expected = original;
        expected.last_updated = Some(now());
        expected.schema_version = Some(CURRENT_SCHEMA_VERSION.to_string());
        assert_eq!(decoded, expected);
        assert_eq!(decoded, encoded.session);
    }

    #[test]
    fn test_last_updated_never_moves_backwards() {
        let mut s = session();
        let later = now() + Duration::minutes(5);
        s.last_updated = Some(later);

        let encoded = codec().encode(&s).unwrap();
        assert_eq!(encoded.session.last_updated, Some(later));
    }

    #[test]
    fn test_last_updated_not_before_start() {
        let mut s = session();
        s.start_time = now() + Duration::minutes(1);
        let encoded = codec().encode(&s).unwrap();
        assert_eq!(encoded.session.last_updated, Some(s.start_time));
    }

    #[test]
    fn test_encode_rejects_invalid_index() {
        let mut s = session();
        s.current_question_index = Some(7);
        assert!(codec().encode(&s).is_err());
    }

    #[test]
    fn test_decode_malformed_is_decode_error() {
        let err = codec().decode("{not json").unwrap_err();
        assert!(err.is_decode());

        let err = codec().decode(r#"{"questions":[]}"#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_decode_legacy_record() {
        let legacy = r#"{
            "settings": {"industry": "banking", "interviewType": "behavioral", "questionCount": 5},
            "questions": [{"id": "q1", "question": "Why banking?", "answer": "Stability"}],
            "currentQuestionIndex": 0,
            "isCompleted": false,
            "startTime": 1767600000000
        }"#;
        let decoded = codec().decode(legacy).unwrap();
        assert_eq!(decoded.schema_version, None);
        assert_eq!(decoded.covered_topics, None);
        assert_eq!(decoded.last_updated, None);
        assert_eq!(decoded.questions.len(), 1);
    }
}
