//! End-to-end continuity scenarios over a file-backed durable store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rehearse_application::{IdentityScopedCleaner, SessionStore};
use rehearse_core::clock::Clock;
use rehearse_core::identity::{IdentityId, IdentityTransition};
use rehearse_core::session::{InterviewSession, InterviewSettings, QuestionRecord};
use rehearse_core::storage::KeyValueStore;
use rehearse_infrastructure::migration::CURRENT_SCHEMA_VERSION;
use rehearse_infrastructure::storage::{FileStore, MemoryStore, PRIMARY_KEY, StorageAdapter};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

struct Profile {
    _dir: TempDir,
    tab: Arc<MemoryStore>,
    disk: Arc<FileStore>,
    clock: Arc<TestClock>,
}

impl Profile {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let disk = Arc::new(FileStore::new(dir.path().join("storage")));
        Self {
            _dir: dir,
            tab: Arc::new(MemoryStore::new()),
            disk,
            clock: Arc::new(TestClock(Mutex::new(t0()))),
        }
    }

    fn adapter(&self) -> StorageAdapter {
        StorageAdapter::new(self.tab.clone(), self.disk.clone())
    }

    /// A fresh store instance, as after a page reload.
    fn store(&self) -> SessionStore {
        SessionStore::new(self.adapter()).with_clock(self.clock.clone())
    }

    fn store_for(&self, identity: &IdentityId) -> SessionStore {
        self.store().with_identity(identity)
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

fn two_answered_of_five() -> InterviewSession {
    let mut s = InterviewSession::new(InterviewSettings::new("fintech", "technical", 5), t0());
    s.push_question(QuestionRecord::new("q1", "How do you reconcile ledgers?"));
    s.record_answer("Double-entry with nightly checks", t0()).unwrap();
    s.push_question(QuestionRecord::new("q2", "Idempotent payment APIs?"));
    s.record_answer("Idempotency keys per request", t0()).unwrap();
    s.current_question_index = Some(1);
    s
}

#[tokio::test]
async fn test_progress_survives_reload() {
    let profile = Profile::new();
    profile.store().save(&two_answered_of_five()).await.unwrap();

    profile.clock.set(t0() + Duration::minutes(10));
    let store = profile.store();
    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.current_question_index, Some(1));
    assert_eq!(loaded.answered_count(), 2);

    let stats = store.stats().await;
    assert!(stats.has_active_session);
    assert_eq!(stats.question_count, 2);
    assert_eq!(stats.completion_rate, 40.0);
    assert_eq!(stats.session_age_ms, 10 * 60 * 1000);
}

#[tokio::test]
async fn test_legacy_record_gains_current_fields() {
    let profile = Profile::new();
    let legacy = r#"{
        "settings": {"industry": "fintech", "interviewType": "technical", "questionCount": 5},
        "questions": [{"id": "q1", "question": "How do you reconcile ledgers?"}],
        "currentQuestionIndex": 0,
        "isCompleted": false,
        "startTime": "2026-06-01T09:00:00Z"
    }"#;
    profile.tab.set(PRIMARY_KEY, legacy).await.unwrap();

    let loaded = profile.store().load().await.unwrap();
    assert_eq!(loaded.schema_version.as_deref(), Some(CURRENT_SCHEMA_VERSION));
    assert_eq!(loaded.covered_topics, Some(BTreeSet::new()));
    assert_eq!(loaded.questions[0].question, "How do you reconcile ledgers?");
}

#[tokio::test]
async fn test_closed_tab_resumes_from_disk() {
    let profile = Profile::new();
    let saved = profile.store().save(&two_answered_of_five()).await.unwrap();

    // New tab: session-scoped storage starts empty, disk survives
    let reopened = Profile {
        tab: Arc::new(MemoryStore::new()),
        ..profile
    };
    let store = reopened.store();
    assert_eq!(store.load().await.unwrap(), saved);
    assert!(reopened.tab.contains_key(PRIMARY_KEY).await);

    // Healed primary alone is enough from here on
    store.clear().await;
    reopened.tab.set(PRIMARY_KEY, &serde_json::to_string(&saved).unwrap()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), saved);
}

#[tokio::test]
async fn test_clear_leaves_nothing_to_load_or_recover() {
    let profile = Profile::new();
    let store = profile.store();
    store.save(&two_answered_of_five()).await.unwrap();

    store.clear().await;
    assert!(store.load().await.is_none());
    assert!(store.recover().await.is_none());
    assert!(!store.stats().await.has_active_session);
}

#[tokio::test]
async fn test_expiry_threshold() {
    let profile = Profile::new();
    profile.store().save(&two_answered_of_five()).await.unwrap();
    let limit = Duration::milliseconds(7_200_000);

    profile.clock.set(t0() + limit - Duration::milliseconds(1));
    assert!(profile.store().load().await.is_some());

    profile.clock.set(t0() + limit + Duration::milliseconds(1));
    assert!(profile.store().load().await.is_none());
    assert!(profile.store().recover().await.is_none());
}

#[tokio::test]
async fn test_identity_switch_isolates_sessions() {
    let profile = Profile::new();
    let cleaner = IdentityScopedCleaner::new(profile.adapter());
    let alice = IdentityId::from("alice");
    let bob = IdentityId::from("bob");

    cleaner.on_identity_established(&alice).await;
    profile
        .store_for(&alice)
        .save(&two_answered_of_five())
        .await
        .unwrap();

    cleaner.on_identity_established(&bob).await;

    let alice_store = profile.store_for(&alice);
    assert!(alice_store.load().await.is_none());
    assert!(alice_store.recover().await.is_none());
    assert!(!alice_store.stats().await.has_active_session);
    assert!(profile.store().load().await.is_none());
    assert!(profile.store_for(&bob).load().await.is_none());
}

#[tokio::test]
async fn test_identities_do_not_share_keys() {
    let profile = Profile::new();
    let alice = IdentityId::from("alice");
    profile
        .store_for(&alice)
        .save(&two_answered_of_five())
        .await
        .unwrap();

    assert!(profile.store_for(&alice).load().await.is_some());
    assert!(profile.store_for(&IdentityId::from("bob")).load().await.is_none());
    assert!(profile.store().load().await.is_none());
}

#[tokio::test]
async fn test_transition_without_previous_identity_isolates_sessions() {
    let profile = Profile::new();
    let cleaner = IdentityScopedCleaner::new(profile.adapter());
    let alice = IdentityId::from("alice");
    let bob = IdentityId::from("bob");

    cleaner.on_identity_established(&alice).await;
    profile
        .store_for(&alice)
        .save(&two_answered_of_five())
        .await
        .unwrap();

    cleaner
        .handle(&IdentityTransition::Established {
            previous: None,
            current: bob,
        })
        .await;

    let alice_store = profile.store_for(&alice);
    assert!(alice_store.load().await.is_none());
    assert!(alice_store.recover().await.is_none());
}
