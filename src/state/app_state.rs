use crate::leaderboard::LeaderboardEntry;
use crate::league::League;
use crate::round::{FirstGoalMinute, RoundResult};
use crate::scoring::{Predictions, calculate_points};
use crate::state::network::LoadingState;
use crate::store::{Language, LocalStore};
use football_data_api::{Match, Standings};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Play screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Editing,
    /// Picks are saved; editing needs an explicit unlock.
    Locked,
}

/// Where the current slate came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlateSource {
    #[default]
    Sample,
    Cached,
    Live,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduleFilter {
    #[default]
    Upcoming,
    Live,
    Finished,
}

impl ScheduleFilter {
    pub fn accepts(&self, m: &Match) -> bool {
        match self {
            ScheduleFilter::Upcoming => m.status.is_upcoming(),
            ScheduleFilter::Live => m.status.is_live(),
            ScheduleFilter::Finished => m.status.is_finished(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayState {
    pub matches: Vec<Match>,
    pub source: SlateSource,
    pub predictions: Predictions,
    pub phase: Phase,
    /// Raw tie-breaker input, validated only on save.
    pub first_goal_input: String,
    pub validation_error: Option<String>,
    pub notice: Option<String>,
}

impl Default for PlayState {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            source: SlateSource::default(),
            predictions: Predictions::new(),
            phase: Phase::Editing,
            first_goal_input: FirstGoalMinute::MIN.to_string(),
            validation_error: None,
            notice: None,
        }
    }
}

impl PlayState {
    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    /// Matchday of the slate, falling back when the fixtures carry none.
    pub fn matchday(&self, fallback: u32) -> u32 {
        self.matches.first().and_then(|m| m.matchday).unwrap_or(fallback)
    }

    pub fn find_match(&self, match_id: u64) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Points earned so far on this slate, uncapped and without blank defaults.
    pub fn live_points(&self) -> u32 {
        self.matches
            .iter()
            .filter_map(|m| Some(calculate_points(self.predictions.get(&m.id)?, m.result())))
            .sum()
    }

    /// Nudge the tie-breaker input, keeping it inside 1..=120.
    pub fn step_first_goal_minute(&mut self, delta: i16) {
        let current = self.first_goal_input.trim().parse::<i16>().unwrap_or(1);
        let next = (current + delta).clamp(
            i16::from(FirstGoalMinute::MIN),
            i16::from(FirstGoalMinute::MAX),
        );
        self.first_goal_input = next.to_string();
        self.validation_error = None;
    }

    pub fn schedule(&self, filter: ScheduleFilter) -> Vec<&Match> {
        self.matches.iter().filter(|m| filter.accepts(m)).collect()
    }
}

// ---------------------------------------------------------------------------
// Whole app
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub play: PlayState,
    pub rounds: Vec<RoundResult>,
    pub leagues: Vec<League>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub profile_name: String,
    pub language: Language,
    pub standings: Standings,
    /// Recent finished matches per team id, for form and head-to-head.
    pub team_results: HashMap<String, Vec<Match>>,
    pub schedule_filter: ScheduleFilter,
    pub loading: LoadingState,
    /// Fixture or network trouble, shown apart from input validation.
    pub banner: Option<String>,
}

impl AppState {
    pub fn from_store(store: &LocalStore) -> Self {
        let mut state = Self::default();
        state.reload(store);
        state
    }

    /// Refresh everything the store owns. The slate and loading state are kept.
    pub fn reload(&mut self, store: &LocalStore) {
        self.play.predictions = store.load_predictions();
        self.rounds = store.load_rounds();
        self.leagues = store.load_leagues();
        self.leaderboard = store.load_leaderboard();
        self.profile_name = store.load_profile_name();
        self.language = store.load_language();
    }
}
