//! SQLite-backed progress store.
//!
//! Holds the `tree_progress` and `quiz_scores` tables. Queries run on the
//! blocking thread pool so the dispatcher's workers never wait on disk.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::ProgressStore;
use crate::error::ProgressError;
use crate::games::tree::TreeProgress;
use crate::games::trivia::QuizResult;

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS tree_progress (
        user_id TEXT PRIMARY KEY,
        tree_level INTEGER NOT NULL DEFAULT 1 CHECK (tree_level >= 1),
        water_count INTEGER NOT NULL DEFAULT 0 CHECK (water_count >= 0),
        last_watered_at TEXT
    );

    CREATE TABLE IF NOT EXISTS quiz_scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        quiz_type TEXT NOT NULL,
        score INTEGER NOT NULL CHECK (score >= 0),
        total_questions INTEGER NOT NULL CHECK (total_questions > 0),
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_quiz_scores_user ON quiz_scores(user_id);
"#;

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, ProgressError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ProgressError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ProgressError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, ProgressError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ProgressError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| ProgressError::LockPoisoned)?;
            f(&conn)
        })
        .await?
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ProgressError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn read_tree(conn: &Connection, user_id: &str) -> Result<Option<TreeProgress>, ProgressError> {
    let row = conn
        .query_row(
            "SELECT tree_level, water_count, last_watered_at FROM tree_progress WHERE user_id = ?1",
            params![user_id],
            |r| {
                Ok((
                    r.get::<_, u32>(0)?,
                    r.get::<_, u32>(1)?,
                    r.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((level, water_count, last_watered_at)) = row else {
        return Ok(None);
    };
    let last_watered_at = last_watered_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(Some(TreeProgress {
        user_id: user_id.to_string(),
        level,
        water_count,
        last_watered_at,
    }))
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn load_or_create_tree(&self, user_id: &str) -> Result<TreeProgress, ProgressError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO tree_progress (user_id, tree_level, water_count) VALUES (?1, 1, 0)",
                params![user_id],
            )?;
            read_tree(conn, &user_id)?.ok_or(ProgressError::MissingTree(user_id))
        })
        .await
    }

    async fn find_tree(&self, user_id: &str) -> Result<Option<TreeProgress>, ProgressError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| read_tree(conn, &user_id)).await
    }

    async fn save_tree(&self, progress: &TreeProgress) -> Result<(), ProgressError> {
        let progress = progress.clone();
        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE tree_progress SET tree_level = ?2, water_count = ?3, last_watered_at = ?4 WHERE user_id = ?1",
                params![
                    progress.user_id,
                    progress.level,
                    progress.water_count,
                    progress.last_watered_at.map(|t| t.to_rfc3339()),
                ],
            )?;
            if updated == 0 {
                return Err(ProgressError::MissingTree(progress.user_id));
            }
            Ok(())
        })
        .await
    }

    async fn append_quiz_result(&self, result: &QuizResult) -> Result<(), ProgressError> {
        let result = result.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO quiz_scores (user_id, quiz_type, score, total_questions, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    result.user_id,
                    result.quiz_type,
                    result.score,
                    result.total_questions,
                    result.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn quiz_results(&self, user_id: &str) -> Result<Vec<QuizResult>, ProgressError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT quiz_type, score, total_questions, created_at FROM quiz_scores WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![user_id], |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, u32>(1)?,
                        r.get::<_, u32>(2)?,
                        r.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(quiz_type, score, total_questions, created_at)| {
                    QuizResult::new(
                        user_id.as_str(),
                        quiz_type,
                        score,
                        total_questions,
                        parse_timestamp(&created_at)?,
                    )
                })
                .collect()
        })
        .await
    }
}
