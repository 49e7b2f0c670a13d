use serde::{Deserialize, Serialize};

use super::scoring::{impact_percent, Impact};
use super::SessionPhase;
use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub text: String,
    pub impact: Impact,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub prompt: String,
    pub options: [ScenarioOption; 3],
}

fn option(text: &str, impact: Impact, feedback: &str) -> ScenarioOption {
    ScenarioOption {
        text: text.to_string(),
        impact,
        feedback: feedback.to_string(),
    }
}

/// The everyday-choices deck played by every session.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            prompt: "You're going to the grocery store. What bag do you bring?".to_string(),
            options: [
                option("Plastic bag from store", Impact::Harmful, "Plastic bags harm marine life and take 1000 years to decompose."),
                option("Paper bag from store", Impact::Neutral, "Better than plastic, but requires energy and trees to produce."),
                option("Reusable cloth bag", Impact::Excellent, "Excellent! Reusable bags reduce waste significantly."),
            ],
        },
        Scenario {
            prompt: "How do you commute to work/school today?".to_string(),
            options: [
                option("Drive alone in car", Impact::Harmful, "Cars emit significant CO2. Consider carpooling!"),
                option("Take public transport", Impact::Positive, "Good choice! Public transport reduces carbon footprint."),
                option("Bike or walk", Impact::Excellent, "Perfect! Zero emissions and great for your health!"),
            ],
        },
        Scenario {
            prompt: "You want to buy new clothes. Where do you shop?".to_string(),
            options: [
                option("Fast fashion store", Impact::Harmful, "Fast fashion creates massive waste and pollution."),
                option("Regular retail store", Impact::Neutral, "Okay choice, but consider sustainable brands next time."),
                option("Thrift store or sustainable brand", Impact::Excellent, "Excellent! Reduces waste and supports circular economy."),
            ],
        },
        Scenario {
            prompt: "How do you handle food waste?".to_string(),
            options: [
                option("Throw everything in trash", Impact::Harmful, "Food waste in landfills produces methane, a potent greenhouse gas."),
                option("Recycle what I can", Impact::Positive, "Good! But composting is even better for food waste."),
                option("Compost organic waste", Impact::Excellent, "Perfect! Composting creates nutrient-rich soil and reduces methane."),
            ],
        },
    ]
}

/// Heading shown above the feedback for a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTone {
    Great,
    Consider,
    Neutral,
}

impl FeedbackTone {
    pub fn for_impact(impact: Impact) -> Self {
        match impact.value() {
            v if v > 0 => FeedbackTone::Great,
            v if v < 0 => FeedbackTone::Consider,
            _ => FeedbackTone::Neutral,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            FeedbackTone::Great => "Great Choice!",
            FeedbackTone::Consider => "Consider This",
            FeedbackTone::Neutral => "Good Try",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Already chosen for this scenario, or no such option
    Ignored,
    Chosen {
        impact: Impact,
        tone: FeedbackTone,
        feedback: String,
    },
}

/// Final standing of a choices session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SustainabilityTier {
    EcoChampion,
    EcoWarrior,
    EcoLearner,
    KeepLearning,
}

impl SustainabilityTier {
    pub fn for_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            SustainabilityTier::EcoChampion
        } else if percent >= 60.0 {
            SustainabilityTier::EcoWarrior
        } else if percent >= 40.0 {
            SustainabilityTier::EcoLearner
        } else {
            SustainabilityTier::KeepLearning
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SustainabilityTier::EcoChampion => "Eco Champion!",
            SustainabilityTier::EcoWarrior => "Eco Warrior!",
            SustainabilityTier::EcoLearner => "Eco Learner",
            SustainabilityTier::KeepLearning => "Keep Learning!",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SustainabilityTier::EcoChampion => "🌟",
            SustainabilityTier::EcoWarrior => "🌿",
            SustainabilityTier::EcoLearner => "🌱",
            SustainabilityTier::KeepLearning => "🌍",
        }
    }
}

/// A run through a fixed deck of scenarios, summing the impact of each choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSession {
    scenarios: Vec<Scenario>,
    current_index: usize,
    impact_score: i32,
    selected_option: Option<usize>,
    phase: SessionPhase,
}

impl ScenarioSession {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, SessionError> {
        if scenarios.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(Self {
            scenarios,
            current_index: 0,
            impact_score: 0,
            selected_option: None,
            phase: SessionPhase::InProgress,
        })
    }

    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self.phase {
            SessionPhase::Complete => None,
            _ => self.scenarios.get(self.current_index),
        }
    }

    pub fn scenario_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn impact_score(&self) -> i32 {
        self.impact_score
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Index of the current scenario's option with this exact text.
    pub fn option_index(&self, text: &str) -> Option<usize> {
        self.current_scenario()?
            .options
            .iter()
            .position(|o| o.text == text)
    }

    pub fn choose(&mut self, option_index: usize) -> ChoiceOutcome {
        if self.phase != SessionPhase::InProgress {
            return ChoiceOutcome::Ignored;
        }
        let Some(chosen) = self
            .scenarios
            .get(self.current_index)
            .and_then(|s| s.options.get(option_index))
        else {
            return ChoiceOutcome::Ignored;
        };

        let impact = chosen.impact;
        let feedback = chosen.feedback.clone();
        self.impact_score += impact.value();
        self.selected_option = Some(option_index);
        self.phase = SessionPhase::AwaitingAdvance;

        ChoiceOutcome::Chosen {
            impact,
            tone: FeedbackTone::for_impact(impact),
            feedback,
        }
    }

    pub fn advance(&mut self) -> SessionPhase {
        if self.phase != SessionPhase::AwaitingAdvance {
            return self.phase;
        }
        self.selected_option = None;
        if self.current_index + 1 < self.scenarios.len() {
            self.current_index += 1;
            self.phase = SessionPhase::InProgress;
        } else {
            self.phase = SessionPhase::Complete;
        }
        self.phase
    }

    pub fn percent(&self) -> f64 {
        impact_percent(self.impact_score, self.scenarios.len())
    }

    pub fn tier(&self) -> SustainabilityTier {
        SustainabilityTier::for_percent(self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(choices: &[usize]) -> ScenarioSession {
        let mut session = ScenarioSession::new(default_scenarios()).unwrap();
        for &choice in choices {
            session.choose(choice);
            session.advance();
        }
        session
    }

    #[test]
    fn default_deck_has_four_scenarios_with_worst_and_best_options() {
        let deck = default_scenarios();
        assert_eq!(deck.len(), 4);
        for scenario in &deck {
            assert_eq!(scenario.options[0].impact, Impact::Harmful);
            assert_eq!(scenario.options[2].impact, Impact::Excellent);
        }
    }

    #[test]
    fn all_worst_choices_score_zero_percent() {
        let s = play(&[0, 0, 0, 0]);
        assert!(s.is_complete());
        assert_eq!(s.impact_score(), -8);
        assert_eq!(s.percent(), 0.0);
        assert_eq!(s.tier(), SustainabilityTier::KeepLearning);
    }

    #[test]
    fn all_best_choices_score_full_marks() {
        let s = play(&[2, 2, 2, 2]);
        assert_eq!(s.impact_score(), 8);
        assert_eq!(s.percent(), 100.0);
        assert_eq!(s.tier(), SustainabilityTier::EcoChampion);
    }

    #[test]
    fn neutral_choices_land_in_the_middle() {
        let neutral = vec![
            Scenario {
                prompt: "Neutral".to_string(),
                options: [
                    option("a", Impact::Neutral, ""),
                    option("b", Impact::Neutral, ""),
                    option("c", Impact::Neutral, ""),
                ],
            };
            4
        ];
        let mut s = ScenarioSession::new(neutral).unwrap();
        for _ in 0..4 {
            s.choose(1);
            s.advance();
        }
        assert_eq!(s.impact_score(), 0);
        assert_eq!(s.percent(), 50.0);
        assert_eq!(s.tier(), SustainabilityTier::EcoLearner);
    }

    #[test]
    fn mixed_choices_pick_the_matching_tier() {
        // 2 + 1 + 2 + 1 = 6, past N: capped at 100%
        assert_eq!(play(&[2, 1, 2, 1]).tier(), SustainabilityTier::EcoChampion);
        // 2 + 1 + 0 + 1 = 4: 100%
        let s = play(&[2, 1, 1, 1]);
        assert_eq!(s.impact_score(), 4);
        assert_eq!(s.percent(), 100.0);
        assert_eq!(s.tier(), SustainabilityTier::EcoChampion);
        // 0 + 1 + 0 + 1 = 2: 75%
        assert_eq!(play(&[1, 1, 1, 1]).tier(), SustainabilityTier::EcoWarrior);
        // 0 + 1 - 2 + 2 = 1: 62.5%
        let s = play(&[1, 1, 0, 2]);
        assert_eq!(s.impact_score(), 1);
        assert_eq!(s.percent(), 62.5);
        assert_eq!(s.tier(), SustainabilityTier::EcoWarrior);
        // 0 + 1 + 0 - 2 = -1: 37.5%
        let s = play(&[1, 1, 1, 0]);
        assert_eq!(s.impact_score(), -1);
        assert_eq!(s.percent(), 37.5);
        assert_eq!(s.tier(), SustainabilityTier::KeepLearning);
        // -2 + 1 - 2 + 1 = -2: 25%
        assert_eq!(play(&[0, 1, 0, 1]).tier(), SustainabilityTier::KeepLearning);
    }

    #[test]
    fn choosing_twice_or_out_of_range_is_ignored() {
        let mut s = ScenarioSession::new(default_scenarios()).unwrap();
        assert_eq!(s.choose(7), ChoiceOutcome::Ignored);
        assert_eq!(s.phase(), SessionPhase::InProgress);

        let first = s.choose(2);
        assert!(matches!(
            first,
            ChoiceOutcome::Chosen { impact: Impact::Excellent, tone: FeedbackTone::Great, .. }
        ));
        assert_eq!(s.choose(0), ChoiceOutcome::Ignored);
        assert_eq!(s.impact_score(), 2);
        assert_eq!(s.selected_option(), Some(2));
    }

    #[test]
    fn option_index_matches_option_text() {
        let s = ScenarioSession::new(default_scenarios()).unwrap();
        assert_eq!(s.option_index("Reusable cloth bag"), Some(2));
        assert_eq!(s.option_index("Bike or walk"), None);
    }

    #[test]
    fn tier_thresholds_are_inclusive() {
        assert_eq!(SustainabilityTier::for_percent(80.0), SustainabilityTier::EcoChampion);
        assert_eq!(SustainabilityTier::for_percent(79.9), SustainabilityTier::EcoWarrior);
        assert_eq!(SustainabilityTier::for_percent(60.0), SustainabilityTier::EcoWarrior);
        assert_eq!(SustainabilityTier::for_percent(40.0), SustainabilityTier::EcoLearner);
        assert_eq!(SustainabilityTier::for_percent(39.9), SustainabilityTier::KeepLearning);
    }

    #[test]
    fn feedback_tone_follows_impact_sign() {
        assert_eq!(FeedbackTone::for_impact(Impact::Harmful).heading(), "Consider This");
        assert_eq!(FeedbackTone::for_impact(Impact::Neutral).heading(), "Good Try");
        assert_eq!(FeedbackTone::for_impact(Impact::Positive).heading(), "Great Choice!");
    }
}
