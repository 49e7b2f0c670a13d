use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::{answer_delta, quiz_percent};
use super::{Question, SessionPhase};
use crate::error::{ProgressError, SessionError};

pub const TRIVIA_QUIZ_TYPE: &str = "trivia";

/// One completed quiz, as appended to the `quiz_scores` history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub user_id: String,
    pub quiz_type: String,
    pub score: u32,
    pub total_questions: u32,
    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn new(
        user_id: impl Into<String>,
        quiz_type: impl Into<String>,
        score: u32,
        total_questions: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        if total_questions == 0 || score > total_questions {
            return Err(ProgressError::InvalidQuizResult {
                score,
                total_questions,
            });
        }
        Ok(Self {
            user_id: user_id.into(),
            quiz_type: quiz_type.into(),
            score,
            total_questions,
            created_at,
        })
    }

    pub fn percent(&self) -> u32 {
        quiz_percent(self.score, self.total_questions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The current question already has an answer
    Ignored,
    Answered {
        correct: bool,
        correct_answer: String,
    },
}

/// A fixed run of trivia questions. Restarting means building a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    selected_answer: Option<String>,
    phase: SessionPhase,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            questions,
            current_index: 0,
            score: 0,
            selected_answer: None,
            phase: SessionPhase::InProgress,
        })
    }

    /// The question being shown, `None` once the session is complete.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Complete => None,
            _ => self.questions.get(self.current_index),
        }
    }

    /// 1-based position of the current question.
    pub fn question_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Records `choice` for the current question. A second answer is a no-op.
    pub fn answer(&mut self, choice: &str) -> AnswerOutcome {
        if self.phase != SessionPhase::InProgress {
            return AnswerOutcome::Ignored;
        }
        let Some(question) = self.questions.get(self.current_index) else {
            return AnswerOutcome::Ignored;
        };

        let correct_answer = question.correct_answer().to_string();
        let correct = choice == correct_answer;
        self.score += answer_delta(correct);
        self.selected_answer = Some(choice.to_string());
        self.phase = SessionPhase::AwaitingAdvance;

        AnswerOutcome::Answered {
            correct,
            correct_answer,
        }
    }

    /// Moves past an answered question; completes after the last one.
    pub fn advance(&mut self) -> SessionPhase {
        if self.phase != SessionPhase::AwaitingAdvance {
            return self.phase;
        }
        self.selected_answer = None;
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.phase = SessionPhase::InProgress;
        } else {
            self.phase = SessionPhase::Complete;
        }
        self.phase
    }

    /// The history row for a completed session.
    pub fn result(&self, user_id: &str) -> Option<Result<QuizResult, ProgressError>> {
        if !self.is_complete() {
            return None;
        }
        Some(QuizResult::new(
            user_id,
            TRIVIA_QUIZ_TYPE,
            self.score,
            self.questions.len() as u32,
            Utc::now(),
        ))
    }

    pub fn percent(&self) -> u32 {
        quiz_percent(self.score, self.questions.len() as u32)
    }

    pub fn closing_remark(&self) -> &'static str {
        let total = self.questions.len() as u32;
        if self.score == total {
            "Perfect! You're an eco expert! 🌱"
        } else if f64::from(self.score) >= f64::from(total) / 2.0 {
            "Great job! Keep learning! 🌿"
        } else {
            "Good try! Practice makes perfect! 🌍"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Question {}", n),
            vec!["right".to_string(), "wrong".to_string()],
            "right",
        )
        .unwrap()
    }

    fn session(len: usize) -> QuizSession {
        QuizSession::new((0..len).map(question).collect()).unwrap()
    }

    fn play(session: &mut QuizSession, answers: &[&str]) {
        for answer in answers {
            session.answer(answer);
            session.advance();
        }
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert_eq!(QuizSession::new(vec![]), Err(SessionError::Empty));
    }

    #[test]
    fn final_score_counts_correct_answers() {
        let mut s = session(5);
        play(&mut s, &["right", "wrong", "right", "right", "wrong"]);
        assert!(s.is_complete());
        assert_eq!(s.score(), 3);
        assert_eq!(s.percent(), 60);
        assert_eq!(s.closing_remark(), "Great job! Keep learning! 🌿");
    }

    #[test]
    fn answering_twice_keeps_the_first_answer() {
        let mut s = session(2);
        assert_eq!(
            s.answer("wrong"),
            AnswerOutcome::Answered {
                correct: false,
                correct_answer: "right".to_string()
            }
        );
        assert_eq!(s.answer("right"), AnswerOutcome::Ignored);
        assert_eq!(s.score(), 0);
        assert_eq!(s.selected_answer(), Some("wrong"));
        assert_eq!(s.phase(), SessionPhase::AwaitingAdvance);
    }

    #[test]
    fn advance_needs_an_answer_first() {
        let mut s = session(2);
        assert_eq!(s.advance(), SessionPhase::InProgress);
        assert_eq!(s.question_number(), 1);

        s.answer("right");
        assert_eq!(s.advance(), SessionPhase::InProgress);
        assert_eq!(s.question_number(), 2);
        assert_eq!(s.selected_answer(), None);
    }

    #[test]
    fn completed_session_stays_complete() {
        let mut s = session(1);
        play(&mut s, &["right"]);
        assert!(s.is_complete());
        assert!(s.current_question().is_none());
        assert_eq!(s.answer("right"), AnswerOutcome::Ignored);
        assert_eq!(s.advance(), SessionPhase::Complete);
        assert_eq!(s.score(), 1);
        assert_eq!(s.closing_remark(), "Perfect! You're an eco expert! 🌱");
    }

    #[test]
    fn result_only_exists_once_complete() {
        let mut s = session(3);
        assert!(s.result("user").is_none());
        play(&mut s, &["wrong", "wrong", "right"]);
        let result = s.result("user").unwrap().unwrap();
        assert_eq!(result.user_id, "user");
        assert_eq!(result.quiz_type, TRIVIA_QUIZ_TYPE);
        assert_eq!((result.score, result.total_questions), (1, 3));
        assert_eq!(s.closing_remark(), "Good try! Practice makes perfect! 🌍");
    }

    #[test]
    fn quiz_result_rejects_impossible_scores() {
        assert!(QuizResult::new("u", "trivia", 6, 5, Utc::now()).is_err());
        assert!(QuizResult::new("u", "trivia", 0, 0, Utc::now()).is_err());
        assert_eq!(
            QuizResult::new("u", "trivia", 4, 5, Utc::now()).unwrap().percent(),
            80
        );
    }
}
