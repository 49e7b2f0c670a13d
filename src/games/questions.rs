use rand::seq::SliceRandom;
use rand::thread_rng;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::QuestionError;
use crate::games::Question;

/// A row of the trivia question file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TriviaRow {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn open(path: &Path) -> Result<Self, QuestionError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a JSON array of rows. Rows that don't form a valid question are skipped.
    pub fn from_reader(reader: impl Read) -> Result<Self, QuestionError> {
        let rows: Vec<TriviaRow> = serde_json::from_reader(reader)?;
        let questions = rows
            .into_iter()
            .filter_map(|row| {
                match Question::new(row.question, row.options, &row.correct_answer) {
                    Ok(question) => Some(question),
                    Err(err) => {
                        log::warn!("Skipping trivia row: {}", err);
                        None
                    }
                }
            })
            .collect();
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Up to `limit` distinct questions in random order, for a fresh session.
    pub fn draw(&self, limit: usize) -> Vec<Question> {
        self.questions
            .choose_multiple(&mut thread_rng(), limit)
            .cloned()
            .collect()
    }
}
