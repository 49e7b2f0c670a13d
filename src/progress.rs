//! Ties the progression engine to the store and the notifier.
//!
//! Every state transition is computed in memory first and only reported as
//! done once the store accepted it. The store stays authoritative: nothing
//! here caches trees, histories or badges between calls.

use std::sync::Arc;

use chrono::Utc;

use crate::error::ProgressError;
use crate::games::achievements::{
    average_score_percent, evaluate, evaluate_history, newly_unlocked, next_challenges,
    AchievementSet, Challenge,
};
use crate::games::tree::{TreeProgress, Watering};
use crate::games::trivia::QuizResult;
use crate::notify::{Notification, Notifier};
use crate::store::ProgressStore;

/// Everything the dashboard shows, recomputed from the stored history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub tree_level: u32,
    pub water_count: u32,
    pub total_quizzes: u32,
    pub average_score: u32,
    pub badges: AchievementSet,
    pub challenges: Vec<Challenge>,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// The user's tree, created on first access. Falls back to a fresh tree if the read fails.
    pub async fn tree(&self, user_id: &str, notifier: &dyn Notifier) -> TreeProgress {
        match self.store.load_or_create_tree(user_id).await {
            Ok(tree) => tree,
            Err(err) => {
                log::error!("Failed to load tree for {}: {}", user_id, err);
                notifier
                    .notify(Notification::error("Error loading tree", err.to_string()))
                    .await;
                TreeProgress::new(user_id)
            }
        }
    }

    /// Waters the user's tree and writes the new state through to the store.
    ///
    /// On failure the error has already been reported to `notifier` and the
    /// stored tree is unchanged.
    pub async fn water(
        &self,
        user_id: &str,
        notifier: &dyn Notifier,
    ) -> Result<Watering, ProgressError> {
        let current = match self.store.load_or_create_tree(user_id).await {
            Ok(tree) => tree,
            Err(err) => {
                log::error!("Failed to load tree for {}: {}", user_id, err);
                notifier
                    .notify(Notification::error("Error loading tree", err.to_string()))
                    .await;
                return Err(err);
            }
        };

        let watering = current.water(Utc::now());
        if let Err(err) = self.store.save_tree(&watering.progress).await {
            log::error!("Failed to save tree for {}: {}", user_id, err);
            notifier
                .notify(Notification::error("Error watering tree", err.to_string()))
                .await;
            return Err(err);
        }

        log::debug!(
            "Watered tree of {}: level {} water {}",
            user_id,
            watering.progress.level,
            watering.progress.water_count
        );

        if watering.leveled_up {
            notifier
                .notify(Notification::level_up(watering.progress.level))
                .await;
            self.announce_level_badges(user_id, current.level, watering.progress.level, notifier)
                .await;
        } else {
            notifier
                .notify(Notification::watered(watering.progress.waters_remaining()))
                .await;
        }

        Ok(watering)
    }

    async fn announce_level_badges(
        &self,
        user_id: &str,
        old_level: u32,
        new_level: u32,
        notifier: &dyn Notifier,
    ) {
        let history = match self.store.quiz_results(user_id).await {
            Ok(history) => history,
            Err(err) => {
                log::warn!("Skipping badge check for {}: {}", user_id, err);
                return;
            }
        };
        let total = history.len() as u32;
        let average = average_score_percent(&history);
        let before = evaluate(old_level, total, average);
        let after = evaluate(new_level, total, average);
        for badge in newly_unlocked(&before, &after) {
            notifier.notify(Notification::badge_unlocked(badge)).await;
        }
    }

    /// Appends a completed quiz to the history and announces any badge it unlocks.
    pub async fn record_quiz(
        &self,
        result: QuizResult,
        notifier: &dyn Notifier,
    ) -> Result<(), ProgressError> {
        let user_id = result.user_id.clone();
        if let Err(err) = self.store.append_quiz_result(&result).await {
            log::error!("Failed to save quiz score for {}: {}", user_id, err);
            notifier
                .notify(Notification::error("Error saving score", err.to_string()))
                .await;
            return Err(err);
        }

        let level = match self.store.find_tree(&user_id).await {
            Ok(tree) => tree.map(|t| t.level).unwrap_or(0),
            Err(err) => {
                log::warn!("Skipping badge check for {}: {}", user_id, err);
                return Ok(());
            }
        };
        let history = match self.store.quiz_results(&user_id).await {
            Ok(history) => history,
            Err(err) => {
                log::warn!("Skipping badge check for {}: {}", user_id, err);
                return Ok(());
            }
        };

        // The history is append-only with a single writer, so our row is the last one
        let before = evaluate_history(level, &history[..history.len().saturating_sub(1)]);
        let after = evaluate_history(level, &history);
        for badge in newly_unlocked(&before, &after) {
            notifier.notify(Notification::badge_unlocked(badge)).await;
        }
        Ok(())
    }

    /// Dashboard numbers from a full read of the store. Failed reads show as empty.
    pub async fn dashboard(&self, user_id: &str, notifier: &dyn Notifier) -> UserStats {
        let tree = match self.store.find_tree(user_id).await {
            Ok(tree) => tree,
            Err(err) => {
                log::error!("Failed to load tree for {}: {}", user_id, err);
                notifier
                    .notify(Notification::error("Error loading tree", err.to_string()))
                    .await;
                None
            }
        };
        let history = match self.store.quiz_results(user_id).await {
            Ok(history) => history,
            Err(err) => {
                log::error!("Failed to load quiz scores for {}: {}", user_id, err);
                notifier
                    .notify(Notification::error("Error loading scores", err.to_string()))
                    .await;
                Vec::new()
            }
        };

        let tree_level = tree.as_ref().map(|t| t.level).unwrap_or(0);
        let water_count = tree.as_ref().map(|t| t.water_count).unwrap_or(0);
        let total_quizzes = history.len() as u32;
        let average_score = average_score_percent(&history);

        UserStats {
            tree_level,
            water_count,
            total_quizzes,
            average_score,
            badges: evaluate(tree_level, total_quizzes, average_score),
            challenges: next_challenges(tree_level, total_quizzes, average_score),
        }
    }
}
