pub mod achievements;
pub mod choices;
pub mod questions;
pub mod scoring;
pub mod tree;
pub mod trivia;

use crate::error::QuestionError;

/// Where a trivia or choices session stands between two user inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    /// Waiting for an answer to the current question
    #[default]
    InProgress,
    /// Answer recorded, the next question shows once the feedback delay has passed
    AwaitingAdvance,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub answers: Vec<Answer>,
}

impl Question {
    /// Builds a question out of its options, flagging the single correct one.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: &str,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if options.is_empty() {
            return Err(QuestionError::NoOptions(text));
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption {
                    question: text,
                    option: option.clone(),
                });
            }
        }
        if !options.iter().any(|o| o == correct_answer) {
            return Err(QuestionError::CorrectAnswerMissing {
                question: text,
                answer: correct_answer.to_string(),
            });
        }

        let answers = options
            .into_iter()
            .map(|option| {
                let is_correct = option == correct_answer;
                Answer::new(option, is_correct)
            })
            .collect();
        Ok(Self { text, answers })
    }

    pub fn correct_answer(&self) -> &str {
        self.answers
            .iter()
            .find(|a| a.is_correct)
            .map(|a| a.text.as_str())
            // `new` guarantees exactly one correct answer
            .unwrap_or_default()
    }

    pub fn has_option(&self, choice: &str) -> bool {
        self.answers.iter().any(|a| a.text == choice)
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|a| a.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}
