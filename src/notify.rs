use async_trait::async_trait;

use crate::games::achievements::BadgeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Error)
    }

    pub fn level_up(level: u32) -> Self {
        Self::new(
            "🎉 Tree Level Up!",
            format!("Your tree is now level {}!", level),
            Severity::Success,
        )
    }

    pub fn watered(waters_remaining: u32) -> Self {
        Self::new(
            "Tree watered!",
            format!("{} more waters needed to level up", waters_remaining),
            Severity::Info,
        )
    }

    pub fn badge_unlocked(badge: BadgeId) -> Self {
        Self::new(
            "Achievement Unlocked!",
            format!("{} {}", badge.icon(), badge.name()),
            Severity::Success,
        )
    }
}

/// Where level-ups, badge unlocks and errors get reported.
///
/// Delivery is fire-and-forget: implementations swallow their own failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}
