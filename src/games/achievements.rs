//! Badge rules.
//!
//! Badges are never stored. They are recomputed from the tree level and the
//! full quiz history every time they are shown.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::scoring::quiz_percent;
use super::trivia::QuizResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BadgeId {
    Seedling,
    Sapling,
    TreeMaster,
    QuizStarter,
    KnowledgeSeeker,
    EcoExpert,
    PerfectScore,
}

pub type AchievementSet = BTreeSet<BadgeId>;

pub const SAPLING_LEVEL: u32 = 5;
pub const TREE_MASTER_LEVEL: u32 = 10;
pub const KNOWLEDGE_SEEKER_QUIZZES: u32 = 5;
pub const ECO_EXPERT_PERCENT: u32 = 80;

impl BadgeId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Seedling => "Seedling",
            Self::Sapling => "Sapling",
            Self::TreeMaster => "Tree Master",
            Self::QuizStarter => "Quiz Starter",
            Self::KnowledgeSeeker => "Knowledge Seeker",
            Self::EcoExpert => "Eco Expert",
            Self::PerfectScore => "Perfect Score",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Seedling => "🌱",
            Self::Sapling => "🌿",
            Self::TreeMaster => "🌳",
            Self::QuizStarter => "📚",
            Self::KnowledgeSeeker => "🔍",
            Self::EcoExpert => "⭐",
            Self::PerfectScore => "🏆",
        }
    }
}

/// All badges earned by a user with this level and quiz history summary.
pub fn evaluate(level: u32, total_quizzes: u32, average_score_percent: u32) -> AchievementSet {
    let mut badges = AchievementSet::new();
    if level >= 1 {
        badges.insert(BadgeId::Seedling);
    }
    if level >= SAPLING_LEVEL {
        badges.insert(BadgeId::Sapling);
    }
    if level >= TREE_MASTER_LEVEL {
        badges.insert(BadgeId::TreeMaster);
    }
    if total_quizzes >= 1 {
        badges.insert(BadgeId::QuizStarter);
    }
    if total_quizzes >= KNOWLEDGE_SEEKER_QUIZZES {
        badges.insert(BadgeId::KnowledgeSeeker);
    }
    if average_score_percent >= ECO_EXPERT_PERCENT {
        badges.insert(BadgeId::EcoExpert);
    }
    if average_score_percent == 100 {
        badges.insert(BadgeId::PerfectScore);
    }
    badges
}

/// Mean of the per-quiz rounded percentages, rounded again. 0 for an empty history.
///
/// Rounding happens per row before averaging, which is not the same as
/// rounding the mean of the raw ratios.
pub fn average_score_percent(results: &[QuizResult]) -> u32 {
    if results.is_empty() {
        return 0;
    }
    let sum: u64 = results
        .iter()
        .map(|r| u64::from(quiz_percent(r.score, r.total_questions)))
        .sum();
    (sum as f64 / results.len() as f64).round() as u32
}

/// Badges evaluated from a level and a full quiz history.
pub fn evaluate_history(level: u32, results: &[QuizResult]) -> AchievementSet {
    evaluate(
        level,
        results.len() as u32,
        average_score_percent(results),
    )
}

/// Badges in `after` that were not in `before`, in badge order.
pub fn newly_unlocked(before: &AchievementSet, after: &AchievementSet) -> Vec<BadgeId> {
    after.difference(before).copied().collect()
}

/// Progress towards a badge that is not unlocked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub badge: BadgeId,
    pub current: u32,
    pub target: u32,
}

impl Challenge {
    pub fn progress_percent(&self) -> u32 {
        quiz_percent(self.current.min(self.target), self.target)
    }

    pub fn description(&self) -> String {
        match self.badge {
            BadgeId::Sapling => format!("Reach Tree Level {}", self.target),
            BadgeId::KnowledgeSeeker => format!("Complete {} Quizzes", self.target),
            BadgeId::EcoExpert => format!("Achieve {}% Average Score", self.target),
            other => format!("Unlock {}", other.name()),
        }
    }
}

/// The next goals to show on the dashboard.
pub fn next_challenges(level: u32, total_quizzes: u32, average_score_percent: u32) -> Vec<Challenge> {
    let mut challenges = Vec::new();
    if level < SAPLING_LEVEL {
        challenges.push(Challenge {
            badge: BadgeId::Sapling,
            current: level,
            target: SAPLING_LEVEL,
        });
    }
    if total_quizzes < KNOWLEDGE_SEEKER_QUIZZES {
        challenges.push(Challenge {
            badge: BadgeId::KnowledgeSeeker,
            current: total_quizzes,
            target: KNOWLEDGE_SEEKER_QUIZZES,
        });
    }
    if average_score_percent < ECO_EXPERT_PERCENT && total_quizzes > 0 {
        challenges.push(Challenge {
            badge: BadgeId::EcoExpert,
            current: average_score_percent,
            target: ECO_EXPERT_PERCENT,
        });
    }
    challenges
}
