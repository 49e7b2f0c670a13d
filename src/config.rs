use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_DB_PATH: &str = "eco_grove.sqlite";
const DEFAULT_DIALOGUE_DB_PATH: &str = "dialogues.sqlite";
const DEFAULT_TRIVIA_PATH: &str = "data/trivia_questions.json";
const DEFAULT_QUESTION_LIMIT: usize = 5;
const DEFAULT_TRIVIA_DELAY_MS: u64 = 2000;
const DEFAULT_CHOICES_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Progress database (`tree_progress`, `quiz_scores`)
    pub db_path: PathBuf,
    /// Dialogue state storage used by the dispatcher
    pub dialogue_db_path: String,
    pub trivia_path: PathBuf,
    /// Questions per trivia session
    pub question_limit: usize,
    /// Pause between trivia feedback and the next question
    pub trivia_delay: Duration,
    /// Pause between choice feedback and the next scenario
    pub choices_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            dialogue_db_path: DEFAULT_DIALOGUE_DB_PATH.to_string(),
            trivia_path: PathBuf::from(DEFAULT_TRIVIA_PATH),
            question_limit: DEFAULT_QUESTION_LIMIT,
            trivia_delay: Duration::from_millis(DEFAULT_TRIVIA_DELAY_MS),
            choices_delay: Duration::from_millis(DEFAULT_CHOICES_DELAY_MS),
        }
    }
}

impl Config {
    /// Reads `ECO_*` variables from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            db_path: lookup("ECO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            dialogue_db_path: lookup("ECO_DIALOGUE_DB_PATH").unwrap_or(defaults.dialogue_db_path),
            trivia_path: lookup("ECO_TRIVIA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.trivia_path),
            question_limit: parse_positive(&lookup, "ECO_QUESTION_LIMIT")?
                .map(|n| n as usize)
                .unwrap_or(defaults.question_limit),
            trivia_delay: parse_positive(&lookup, "ECO_TRIVIA_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.trivia_delay),
            choices_delay: parse_positive(&lookup, "ECO_CHOICES_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.choices_delay),
        })
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
