//! Interview session domain types.
//!
//! This module contains the persisted session record, its settings and
//! question entries, expiry rules, and the derived statistics view.

mod expiry;
mod model;
mod stats;
pub mod timestamp;

pub use expiry::{DEFAULT_SESSION_TIMEOUT_MS, SessionTimeout};
pub use model::{
    ConversationQuality, InterviewSession, InterviewSettings, QuestionRecord, ResponseMetrics,
};
pub use stats::SessionStats;
