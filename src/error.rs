use thiserror::Error;

/// Failures of the persistence collaborator or of a record read back from it.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("storage connection lock poisoned")]
    LockPoisoned,

    #[error("no tree progress stored for user {0}")]
    MissingTree(String),

    #[error("invalid quiz result: score {score} out of {total_questions} questions")]
    InvalidQuizResult { score: u32, total_questions: u32 },

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session needs at least one question")]
    Empty,
}

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("failed to read questions: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse questions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question {0:?} has no options")]
    NoOptions(String),

    #[error("question {question:?} lists option {option:?} more than once")]
    DuplicateOption { question: String, option: String },

    #[error("correct answer {answer:?} is not one of the options of {question:?}")]
    CorrectAnswerMissing { question: String, answer: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got {value:?}")]
    Invalid { name: &'static str, value: String },
}
