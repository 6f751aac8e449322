//! Interview session schema migrations.
//!
//! ### Session Version History
//! - **1.0** (no tag): settings, questions, index, completion flag, timestamps
//! - **2.0**: Added `conversationQuality`
//! - **3.0**: Added `coveredTopics` and `responseMetrics`

use anyhow::Result;
use rehearse_core::session::{ConversationQuality, InterviewSession, ResponseMetrics};
use semver::Version;
use std::collections::BTreeSet;

use super::traits::{Migration, TypedMigration};

/// Migration from legacy untagged records to 2.0.
#[derive(Debug, Default)]
pub struct LegacyToV2Migration;

impl Migration for LegacyToV2Migration {
    fn from_version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn to_version(&self) -> Version {
        Version::new(2, 0, 0)
    }

    fn description(&self) -> &str {
        "Add conversationQuality (defaults to unrated)"
    }
}

impl TypedMigration<InterviewSession, InterviewSession> for LegacyToV2Migration {
    fn migrate(&self, mut from: InterviewSession) -> Result<InterviewSession> {
        from.conversation_quality
            .get_or_insert_with(ConversationQuality::default);
        from.schema_version = Some("2.0".to_string());
        Ok(from)
    }
}

/// Migration from 2.0 to 3.0.
#[derive(Debug, Default)]
pub struct V2ToV3Migration;

impl Migration for V2ToV3Migration {
    fn from_version(&self) -> Version {
        Version::new(2, 0, 0)
    }

    fn to_version(&self) -> Version {
        Version::new(3, 0, 0)
    }

    fn description(&self) -> &str {
        "Add coveredTopics (empty) and responseMetrics (zeroed)"
    }
}

impl TypedMigration<InterviewSession, InterviewSession> for V2ToV3Migration {
    fn migrate(&self, mut from: InterviewSession) -> Result<InterviewSession> {
        // 2.x records written by early builds may still lack the 2.0 field
        from.conversation_quality
            .get_or_insert_with(ConversationQuality::default);
        from.covered_topics.get_or_insert_with(BTreeSet::new);
        from.response_metrics
            .get_or_insert_with(ResponseMetrics::default);
        from.schema_version = Some("3.0".to_string());
        Ok(from)
    }
}
