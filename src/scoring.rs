use football_data_api::Scoreline;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EXACT_SCORE_POINTS: u32 = 5;
pub const CORRECT_OUTCOME_POINTS: u32 = 2;

/// Highest goal count a player can enter for one side.
pub const MAX_PREDICTED_GOALS: u8 = 9;

/// Predictions keyed by match id.
pub type Predictions = BTreeMap<u64, Prediction>;

/// A player's guess for one match. `None` means that side has not been entered yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub home: Option<u8>,
    pub away: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Prediction {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home: Some(home), away: Some(away) }
    }

    pub fn scoreline(&self) -> Option<Scoreline> {
        Some(Scoreline { home: self.home?, away: self.away? })
    }

    /// The guess with blanks read as zero.
    pub fn or_zero(&self) -> Scoreline {
        Scoreline { home: self.home.unwrap_or(0), away: self.away.unwrap_or(0) }
    }

    /// Step one side by `delta`, treating a blank as zero and clamping to [0, 9].
    /// The other side is left as it was.
    pub fn adjusted(&self, side: Side, delta: i8) -> Self {
        let step = |current: Option<u8>| {
            let base = i16::from(current.unwrap_or(0));
            let next = (base + i16::from(delta)).clamp(0, i16::from(MAX_PREDICTED_GOALS));
            Some(next as u8)
        };
        match side {
            Side::Home => Self { home: step(self.home), away: self.away },
            Side::Away => Self { home: self.home, away: step(self.away) },
        }
    }
}

/// Points for one prediction against the final result: 5 for the exact score,
/// 2 for the right outcome, 0 otherwise. No result or an incomplete guess scores 0.
pub fn calculate_points(prediction: &Prediction, result: Option<Scoreline>) -> u32 {
    let (Some(result), Some(guess)) = (result, prediction.scoreline()) else {
        return 0;
    };
    if guess == result {
        EXACT_SCORE_POINTS
    } else if guess.outcome() == result.outcome() {
        CORRECT_OUTCOME_POINTS
    } else {
        0
    }
}
