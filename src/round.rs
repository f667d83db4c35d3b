use crate::error::ValidationError;
use crate::scoring::{Prediction, Predictions, calculate_points};
use chrono::{DateTime, Duration, Utc};
use football_data_api::{Match, Scoreline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Most points a single round can be worth.
pub const ROUND_POINTS_CAP: u32 = 30;

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPick {
    pub match_id: u64,
    pub prediction: Prediction,
    pub result: Option<Scoreline>,
    pub points: u32,
}

/// A finalized, scored snapshot of one matchday's predictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub matchday: u32,
    #[serde(default)]
    pub picks: Vec<RoundPick>,
    pub total_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_goal_minute: Option<FirstGoalMinute>,
}

/// Tie-breaker guess: the minute of the first goal, 1 to 120 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FirstGoalMinute(u8);

impl FirstGoalMinute {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 120;

    /// Validate raw user input such as `" 47 "`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let minute: i64 = input
            .trim()
            .parse()
            .map_err(|_| ValidationError::FirstGoalMinute)?;
        u8::try_from(minute)
            .map_err(|_| ValidationError::FirstGoalMinute)
            .and_then(Self::try_from)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Distance from the actual first-goal minute, used to split ties.
    pub fn distance_to(self, actual: u8) -> u8 {
        self.0.abs_diff(actual)
    }
}

impl TryFrom<u8> for FirstGoalMinute {
    type Error = ValidationError;

    fn try_from(minute: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&minute) {
            Ok(Self(minute))
        } else {
            Err(ValidationError::FirstGoalMinute)
        }
    }
}

impl From<FirstGoalMinute> for u8 {
    fn from(minute: FirstGoalMinute) -> Self {
        minute.0
    }
}

impl fmt::Display for FirstGoalMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'", self.0)
    }
}

/// Score every match of the matchday and cap the total. Blank predictions count
/// as 0-0; matches without a final score are worth nothing yet.
pub fn build_round(
    matchday: u32,
    matches: &[Match],
    predictions: &Predictions,
    first_goal_minute: FirstGoalMinute,
    now: DateTime<Utc>,
) -> RoundResult {
    let picks: Vec<RoundPick> = matches
        .iter()
        .map(|m| {
            let guess = predictions.get(&m.id).copied().unwrap_or_default().or_zero();
            let prediction = Prediction::new(guess.home, guess.away);
            let result = m.result();
            RoundPick {
                match_id: m.id,
                points: calculate_points(&prediction, result),
                prediction,
                result,
            }
        })
        .collect();

    let total_points = capped_total(picks.iter().map(|p| p.points));

    RoundResult {
        id: format!("round-{}", now.timestamp_millis()),
        created_at: now,
        matchday,
        picks,
        total_points,
        first_goal_minute: Some(first_goal_minute),
    }
}

pub fn capped_total(points: impl Iterator<Item = u32>) -> u32 {
    points.sum::<u32>().min(ROUND_POINTS_CAP)
}

/// Put `round` first and drop any other round for the same matchday.
pub fn supersede(rounds: Vec<RoundResult>, round: RoundResult) -> Vec<RoundResult> {
    let matchday = round.matchday;
    std::iter::once(round)
        .chain(rounds.into_iter().filter(|r| r.matchday != matchday))
        .collect()
}

/// Clamp stored totals written before the cap existed. Returns true when any
/// round changed.
pub fn cap_round_totals(rounds: &mut [RoundResult]) -> bool {
    let mut changed = false;
    for round in rounds.iter_mut().filter(|r| r.total_points > ROUND_POINTS_CAP) {
        round.total_points = ROUND_POINTS_CAP;
        changed = true;
    }
    changed
}

/// Sum of totals for rounds created at or after `cutoff`.
pub fn points_since(rounds: &[RoundResult], cutoff: DateTime<Utc>) -> u32 {
    rounds
        .iter()
        .filter(|r| r.created_at >= cutoff)
        .map(|r| r.total_points)
        .sum()
}

pub fn weekly_points(rounds: &[RoundResult], now: DateTime<Utc>) -> u32 {
    points_since(rounds, now - Duration::days(WEEK_DAYS))
}

pub fn monthly_points(rounds: &[RoundResult], now: DateTime<Utc>) -> u32 {
    points_since(rounds, now - Duration::days(MONTH_DAYS))
}

pub fn season_points(rounds: &[RoundResult]) -> u32 {
    rounds.iter().map(|r| r.total_points).sum()
}
