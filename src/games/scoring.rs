//! Score deltas for single actions and the percentage remaps shown when a game ends.

use serde::{Deserialize, Serialize};

pub const CORRECT_ANSWER_POINTS: u32 = 1;

/// Points a trivia answer adds to the running score.
pub fn answer_delta(correct: bool) -> u32 {
    if correct {
        CORRECT_ANSWER_POINTS
    } else {
        0
    }
}

/// Environmental effect of a simulated lifestyle choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Harmful,
    Neutral,
    Positive,
    Excellent,
}

impl Impact {
    pub fn value(self) -> i32 {
        match self {
            Impact::Harmful => -2,
            Impact::Neutral => 0,
            Impact::Positive => 1,
            Impact::Excellent => 2,
        }
    }
}

/// `round(score / total * 100)`, the per-quiz percentage. Zero questions score 0.
pub fn quiz_percent(score: u32, total_questions: u32) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    (f64::from(score) / f64::from(total_questions) * 100.0).round() as u32
}

/// `(score + N) / 2N * 100` for a session of `N` scenarios, clamped to `[0, 100]`.
///
/// The score can reach `-2N` and `2N`, so both ends saturate before the
/// extremes: anything at or above `N` is 100%.
pub fn impact_percent(impact_score: i32, scenarios: usize) -> f64 {
    if scenarios == 0 {
        return 0.0;
    }
    let span = scenarios as f64;
    let percent = (f64::from(impact_score) + span) / (2.0 * span) * 100.0;
    percent.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_delta_is_one_for_correct_only() {
        assert_eq!(answer_delta(true), 1);
        assert_eq!(answer_delta(false), 0);
    }

    #[test]
    fn impact_values_cover_the_observed_range() {
        let values: Vec<i32> = [
            Impact::Harmful,
            Impact::Neutral,
            Impact::Positive,
            Impact::Excellent,
        ]
        .iter()
        .map(|i| i.value())
        .collect();
        assert_eq!(values, vec![-2, 0, 1, 2]);
    }

    #[test]
    fn impact_percent_maps_extremes_and_middle() {
        assert_eq!(impact_percent(-8, 4), 0.0);
        assert_eq!(impact_percent(8, 4), 100.0);
        assert_eq!(impact_percent(0, 4), 50.0);
        assert_eq!(impact_percent(4, 4), 100.0);
        assert_eq!(impact_percent(1, 4), 62.5);
        assert_eq!(impact_percent(-1, 4), 37.5);
        assert_eq!(impact_percent(-4, 4), 0.0);
        assert_eq!(impact_percent(3, 0), 0.0);
    }

    #[test]
    fn quiz_percent_rounds_to_nearest() {
        assert_eq!(quiz_percent(1, 3), 33);
        assert_eq!(quiz_percent(2, 3), 67);
        assert_eq!(quiz_percent(1, 8), 13);
        assert_eq!(quiz_percent(5, 5), 100);
        assert_eq!(quiz_percent(0, 0), 0);
    }
}
