//! Progression and scoring engine for the eco grove bot.
//!
//! Users grow a virtual tree by watering it, play eco trivia and sustainable
//! choice games, and unlock badges derived from their persisted history.

pub mod config;
pub mod error;
pub mod games;
pub mod notify;
pub mod progress;
pub mod store;

pub use error::{ConfigError, ProgressError, QuestionError, SessionError};
