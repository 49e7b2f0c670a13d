//! Shared test doubles for the progress service tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use eco_grove_bot::error::ProgressError;
use eco_grove_bot::games::tree::TreeProgress;
use eco_grove_bot::games::trivia::QuizResult;
use eco_grove_bot::notify::{Notification, Notifier, Severity};
use eco_grove_bot::store::{ProgressStore, SqliteStore};
use tempfile::TempDir;

/// Keeps every notification it receives
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.title).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.severity == severity)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// A SQLite store whose writes can be switched to fail
pub struct FlakyStore {
    pub inner: SqliteStore,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), ProgressError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProgressError::Storage(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn load_or_create_tree(&self, user_id: &str) -> Result<TreeProgress, ProgressError> {
        self.inner.load_or_create_tree(user_id).await
    }

    async fn find_tree(&self, user_id: &str) -> Result<Option<TreeProgress>, ProgressError> {
        self.inner.find_tree(user_id).await
    }

    async fn save_tree(&self, progress: &TreeProgress) -> Result<(), ProgressError> {
        self.check_write()?;
        self.inner.save_tree(progress).await
    }

    async fn append_quiz_result(&self, result: &QuizResult) -> Result<(), ProgressError> {
        self.check_write()?;
        self.inner.append_quiz_result(result).await
    }

    async fn quiz_results(&self, user_id: &str) -> Result<Vec<QuizResult>, ProgressError> {
        self.inner.quiz_results(user_id).await
    }
}

/// Opens a store in a fresh temp dir; keep the dir alive for the test's duration
pub fn temp_store() -> (TempDir, SqliteStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::open(&dir.path().join("progress.sqlite"))
        .expect("Failed to open progress db");
    (dir, store)
}
