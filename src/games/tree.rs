use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Waterings needed per level: level `n` levels up after `n * 5` waterings.
pub const WATERS_PER_LEVEL: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeProgress {
    pub user_id: String,
    pub level: u32,
    pub water_count: u32,
    pub last_watered_at: Option<DateTime<Utc>>,
}

/// Result of a single watering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watering {
    pub progress: TreeProgress,
    pub leveled_up: bool,
}

impl TreeProgress {
    /// A fresh level 1 tree that has never been watered.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            level: 1,
            water_count: 0,
            last_watered_at: None,
        }
    }

    /// Number of waterings that completes the current level.
    pub fn threshold(&self) -> u32 {
        self.level.saturating_mul(WATERS_PER_LEVEL)
    }

    pub fn waters_remaining(&self) -> u32 {
        self.threshold().saturating_sub(self.water_count)
    }

    pub fn stage(&self) -> TreeStage {
        TreeStage::for_level(self.level)
    }

    /// Applies one watering. Reaching the threshold rolls the count over into a new level.
    pub fn water(&self, now: DateTime<Utc>) -> Watering {
        debug_assert!(self.level >= 1, "tree level starts at 1");
        debug_assert!(
            self.water_count < self.threshold(),
            "water count {} already at threshold {}",
            self.water_count,
            self.threshold()
        );

        let water_count = self.water_count + 1;
        let leveled_up = water_count >= self.threshold();
        let progress = if leveled_up {
            TreeProgress {
                user_id: self.user_id.clone(),
                level: self.level + 1,
                water_count: 0,
                last_watered_at: Some(now),
            }
        } else {
            TreeProgress {
                user_id: self.user_id.clone(),
                level: self.level,
                water_count,
                last_watered_at: Some(now),
            }
        };

        Watering {
            progress,
            leveled_up,
        }
    }
}

/// How the tree looks at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStage {
    Sprout,
    Bush,
    Tree,
    Evergreen,
}

impl TreeStage {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => TreeStage::Sprout,
            3..=5 => TreeStage::Bush,
            6..=10 => TreeStage::Tree,
            _ => TreeStage::Evergreen,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TreeStage::Sprout => "🌱",
            TreeStage::Bush => "🌿",
            TreeStage::Tree => "🌳",
            TreeStage::Evergreen => "🌲",
        }
    }
}
