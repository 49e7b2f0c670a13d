//! Persistence collaborator for tree progress and quiz history.

mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::ProgressError;
use crate::games::tree::TreeProgress;
use crate::games::trivia::QuizResult;

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Reads the user's tree, inserting the level 1 default first if none exists.
    ///
    /// Implementations must do the insert as a single conditional statement so
    /// two first loads racing each other still leave one row.
    async fn load_or_create_tree(&self, user_id: &str) -> Result<TreeProgress, ProgressError>;

    /// Reads the user's tree without creating it.
    async fn find_tree(&self, user_id: &str) -> Result<Option<TreeProgress>, ProgressError>;

    /// Updates level, water count and last watered time of an existing row.
    async fn save_tree(&self, progress: &TreeProgress) -> Result<(), ProgressError>;

    async fn append_quiz_result(&self, result: &QuizResult) -> Result<(), ProgressError>;

    /// Full quiz history of the user, oldest first.
    async fn quiz_results(&self, user_id: &str) -> Result<Vec<QuizResult>, ProgressError>;
}
