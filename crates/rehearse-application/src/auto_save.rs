//! Periodic persistence of the in-memory session.

use rehearse_core::config::ContinuityConfig;
use rehearse_core::session::InterviewSession;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::session_store::SessionStore;

/// Starts background tasks that save a session at a fixed interval.
///
/// The session is captured by value when the task starts. When the caller
/// replaces its in-memory session (a new question, an answer), it cancels
/// the running handle and starts a new one with the fresh snapshot.
pub struct AutoSaveScheduler {
    store: Arc<SessionStore>,
    interval: Duration,
}

impl AutoSaveScheduler {
    /// A zero interval is clamped to one millisecond.
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(store: Arc<SessionStore>, config: &ContinuityConfig) -> Self {
        Self::new(store, config.auto_save_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the save loop for `session` on the current tokio runtime.
    ///
    /// The first save happens one interval after start. Save failures are
    /// logged by the store and do not stop the loop.
    pub fn start(&self, session: InterviewSession) -> AutoSaveHandle {
        let token = CancellationToken::new();
        let saves = Arc::new(AtomicU64::new(0));
        let period = self.interval;

        let task = tokio::spawn({
            let store = Arc::clone(&self.store);
            let token = token.clone();
            let saves = Arc::clone(&saves);
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                tracing::debug!("Auto-save started ({}ms interval)", period.as_millis());

                loop {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            if store.save(&session).await.is_ok() {
                                saves.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    }
                }

                tracing::debug!("Auto-save stopped");
            }
        });

        AutoSaveHandle {
            token,
            saves,
            task: Some(task),
        }
    }
}

/// Controls one running auto-save loop. Dropping the handle cancels it.
pub struct AutoSaveHandle {
    token: CancellationToken,
    saves: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl AutoSaveHandle {
    /// Stops further saves. Calling it again has no effect.
    ///
    /// A save already in flight completes; no save starts afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Number of saves that completed successfully so far.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    /// Cancels and waits for the loop to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Auto-save task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rehearse_core::session::{InterviewSettings, QuestionRecord};
    use rehearse_core::storage::KeyValueStore;
    use rehearse_infrastructure::storage::{MemoryStore, PRIMARY_KEY, StorageAdapter};

    const PERIOD: Duration = Duration::from_secs(30);

    fn setup() -> (Arc<MemoryStore>, AutoSaveScheduler) {
        let primary = Arc::new(MemoryStore::new());
        let adapter = StorageAdapter::new(primary.clone(), Arc::new(MemoryStore::new()));
        let store = Arc::new(SessionStore::new(adapter));
        (primary, AutoSaveScheduler::new(store, PERIOD))
    }

    fn session() -> InterviewSession {
        let mut s = InterviewSession::new(InterviewSettings::new("retail", "behavioral", 3), Utc::now());
        s.push_question(QuestionRecord::new("q1", "Tell me about a conflict"));
        s
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_once_per_interval() {
        let (primary, scheduler) = setup();
        let handle = scheduler.start(session());

        tokio::time::sleep(PERIOD / 2).await;
        assert_eq!(handle.save_count(), 0);
        assert!(!primary.contains_key(PRIMARY_KEY).await);

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(handle.save_count(), 3);
        assert!(primary.get(PRIMARY_KEY).await.unwrap().is_some());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_saves_after_cancel() {
        let (primary, scheduler) = setup();
        let handle = scheduler.start(session());

        tokio::time::sleep(PERIOD + PERIOD / 2).await;
        assert_eq!(handle.save_count(), 1);

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        primary.clear().await;
        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(handle.save_count(), 1);
        assert!(primary.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (primary, scheduler) = setup();
        drop(scheduler.start(session()));

        tokio::time::sleep(PERIOD * 3).await;
        assert!(primary.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_saves_keep_the_loop_running() {
        let (primary, scheduler) = setup();
        primary.set_available(false);
        let handle = scheduler.start(session());

        tokio::time::sleep(PERIOD * 2 + PERIOD / 2).await;
        assert_eq!(handle.save_count(), 0);

        primary.set_available(true);
        tokio::time::sleep(PERIOD).await;
        assert_eq!(handle.save_count(), 1);
        handle.shutdown().await;
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let store = Arc::new(SessionStore::new(StorageAdapter::in_memory()));
        let scheduler = AutoSaveScheduler::new(store, Duration::ZERO);
        assert_eq!(scheduler.interval(), Duration::from_millis(1));
    }
}
