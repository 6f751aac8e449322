//! Interview session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::timestamp;
use crate::error::{RehearseError, Result};

/// Interview configuration chosen at setup.
///
/// Only `question_count` is interpreted by the continuity layer (for the
/// completion rate). Unknown keys written by newer UIs are kept in `extra`
/// so that a save never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSettings {
    pub industry: String,
    pub interview_type: String,
    /// Target number of questions for the interview
    pub question_count: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InterviewSettings {
    pub fn new(
        industry: impl Into<String>,
        interview_type: impl Into<String>,
        question_count: u32,
    ) -> Self {
        Self {
            industry: industry.into(),
            interview_type: interview_type.into(),
            question_count,
            extra: BTreeMap::new(),
        }
    }
}

/// One question asked during the interview and the answer given to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub asked_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub answered_at: Option<DateTime<Utc>>,
}

impl QuestionRecord {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: None,
            topic: None,
            feedback: None,
            asked_at: None,
            answered_at: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Overall quality classification of the conversation so far (schema 2.0+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationQuality {
    #[default]
    Unrated,
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Aggregate answer timing (schema 3.0+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetrics {
    pub answered_count: u32,
    pub total_response_ms: u64,
    pub average_response_ms: u64,
}

impl ResponseMetrics {
    /// Folds one more answer duration into the aggregate.
    pub fn record(&mut self, response_ms: u64) {
        self.answered_count += 1;
        self.total_response_ms += response_ms;
        self.average_response_ms = self.total_response_ms / u64::from(self.answered_count);
    }
}

/// The persisted interview session.
///
/// Fields introduced by later schema versions are `Option`s: they are absent
/// in records written by older builds and are filled with defaults by the
/// upgrade step. A record is only resumed while `is_completed` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub settings: InterviewSettings,
    /// Questions in the order they were asked
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    /// Index of the active question, absent while `questions` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question_index: Option<usize>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    /// Absent in legacy (pre-2.0) records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_quality: Option<ConversationQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_topics: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_metrics: Option<ResponseMetrics>,
}

impl InterviewSession {
    /// Creates an empty session in the current record shape.
    ///
    /// The schema version itself is attached on encode.
    pub fn new(settings: InterviewSettings, start_time: DateTime<Utc>) -> Self {
        Self {
            settings,
            questions: Vec::new(),
            current_question_index: None,
            is_completed: false,
            start_time,
            last_updated: None,
            schema_version: None,
            conversation_quality: Some(ConversationQuality::default()),
            covered_topics: Some(BTreeSet::new()),
            response_metrics: Some(ResponseMetrics::default()),
        }
    }

    /// Appends a question and makes it the active one.
    pub fn push_question(&mut self, question: QuestionRecord) {
        if let Some(topic) = &question.topic {
            self.covered_topics
                .get_or_insert_with(BTreeSet::new)
                .insert(topic.clone());
        }
        self.questions.push(question);
        self.current_question_index = Some(self.questions.len() - 1);
    }

    /// Returns the active question, if any.
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current_question_index
            .and_then(|index| self.questions.get(index))
    }

    /// Records the answer to the active question.
    ///
    /// The response time is measured from `asked_at` when the question
    /// carries one.
    pub fn record_answer(&mut self, answer: impl Into<String>, at: DateTime<Utc>) -> Result<()> {
        let index = self
            .current_question_index
            .ok_or_else(|| RehearseError::internal("no active question to answer"))?;
        let question = self
            .questions
            .get_mut(index)
            .ok_or_else(|| RehearseError::internal(format!("question index {} out of range", index)))?;

        question.answer = Some(answer.into());
        question.answered_at = Some(at);

        if let Some(asked_at) = question.asked_at {
            let elapsed = (at - asked_at).num_milliseconds().max(0) as u64;
            self.response_metrics
                .get_or_insert_with(ResponseMetrics::default)
                .record(elapsed);
        }
        Ok(())
    }

    /// Moves to the next question. Returns false when already at the last one.
    pub fn advance(&mut self) -> bool {
        match self.current_question_index {
            Some(index) if index + 1 < self.questions.len() => {
                self.current_question_index = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered()).count()
    }

    /// The instant expiry is measured from.
    pub fn activity_time(&self) -> DateTime<Utc> {
        self.last_updated.unwrap_or(self.start_time)
    }

    /// Checks the structural invariants of a record.
    ///
    /// - `current_question_index` is in range when questions exist, absent otherwise
    /// - `last_updated >= start_time`
    pub fn validate(&self) -> Result<()> {
        match (self.current_question_index, self.questions.len()) {
            (Some(index), len) if index >= len => {
                return Err(RehearseError::decode(format!(
                    "currentQuestionIndex {} out of range for {} questions",
                    index, len
                )));
            }
            (None, len) if len > 0 => {
                return Err(RehearseError::decode(format!(
                    "currentQuestionIndex missing for {} questions",
                    len
                )));
            }
            _ => {}
        }

        if let Some(last_updated) = self.last_updated {
            if last_updated < self.start_time {
                return Err(RehearseError::decode(format!(
                    "lastUpdated {} precedes startTime {}",
                    last_updated, self.start_time
                )));
            }
        }

        Ok(())
    }
}
