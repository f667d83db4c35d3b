//! Pure reconciliation of local collections with the rows pulled from the backend.
//! Every merge is a union over the collection's key in which the remote side wins.

use crate::leaderboard::{LeaderboardEntry, YOU_ID};
use crate::league::League;
use crate::remote::{LeaderboardRow, MembershipRow, PredictionRow, RoundRow};
use crate::round::{FirstGoalMinute, RoundResult};
use crate::scoring::{Prediction, Predictions};
use chrono::{DateTime, Utc};
use log::warn;
use std::collections::HashMap;

const DEFAULT_LEAGUE_NAME: &str = "League";

pub fn merge_predictions(mut local: Predictions, remote: &[PredictionRow]) -> Predictions {
    for row in remote {
        local.insert(row.match_id, Prediction::new(row.home, row.away));
    }
    local
}

/// Union by id, remote rows replacing local ones, newest first. Rounds rebuilt
/// from remote rows have no picks.
pub fn merge_rounds(local: Vec<RoundResult>, remote: &[RoundRow]) -> Vec<RoundResult> {
    let mut by_id: HashMap<String, RoundResult> =
        local.into_iter().map(|r| (r.id.clone(), r)).collect();
    for row in remote {
        by_id.insert(row.id.clone(), round_from_row(row));
    }

    let mut rounds: Vec<RoundResult> = by_id.into_values().collect();
    rounds.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    rounds
}

/// Union by code. Memberships whose league has no code are ignored.
pub fn merge_leagues(local: Vec<League>, remote: &[MembershipRow]) -> Vec<League> {
    let mut leagues = local;
    for row in remote {
        let Some(info) = row.league.as_ref() else {
            continue;
        };
        let Some(code) = info.code.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let league = League {
            id: row.league_id.clone(),
            name: info.name.clone().unwrap_or_else(|| DEFAULT_LEAGUE_NAME.to_owned()),
            code: code.to_owned(),
            members: 0,
        };
        match leagues.iter_mut().find(|l| l.code == code) {
            Some(existing) => *existing = league,
            None => leagues.push(league),
        }
    }
    leagues
}

/// Only the local player's entry is shared; a remote row replaces it outright.
pub fn merge_leaderboard(
    mut local: Vec<LeaderboardEntry>,
    remote: Option<&LeaderboardRow>,
) -> Vec<LeaderboardEntry> {
    let Some(row) = remote else {
        return local;
    };
    let you = LeaderboardEntry::you(row.total_points.unwrap_or(0), row.weekly_points.unwrap_or(0));
    match local.iter_mut().find(|e| e.is_you()) {
        Some(existing) => *existing = you,
        None => local.push(you),
    }
    local
}

/// The remote name wins when it is non-empty.
pub fn merge_profile_name(local: String, remote: Option<&str>) -> String {
    match remote {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => local,
    }
}

// ---------------------------------------------------------------------------
// Row conversions
// ---------------------------------------------------------------------------

/// Blank sides are pushed as zero.
pub fn prediction_rows(user_id: &str, predictions: &Predictions) -> Vec<PredictionRow> {
    predictions
        .iter()
        .map(|(match_id, prediction)| {
            let guess = prediction.or_zero();
            PredictionRow {
                user_id: user_id.to_owned(),
                match_id: *match_id,
                home: guess.home,
                away: guess.away,
            }
        })
        .collect()
}

pub fn round_rows(user_id: &str, rounds: &[RoundResult]) -> Vec<RoundRow> {
    rounds
        .iter()
        .map(|r| RoundRow {
            id: r.id.clone(),
            user_id: user_id.to_owned(),
            matchday: r.matchday,
            total_points: r.total_points,
            first_goal_minute: r.first_goal_minute.map(FirstGoalMinute::get),
            created_at: r.created_at,
        })
        .collect()
}

pub fn leaderboard_row(
    user_id: &str,
    entries: &[LeaderboardEntry],
    now: DateTime<Utc>,
) -> Option<LeaderboardRow> {
    let you = entries.iter().find(|e| e.id == YOU_ID)?;
    Some(LeaderboardRow {
        user_id: user_id.to_owned(),
        total_points: Some(you.total_points),
        weekly_points: Some(you.weekly_points),
        updated_at: Some(now),
    })
}

fn round_from_row(row: &RoundRow) -> RoundResult {
    let first_goal_minute = row.first_goal_minute.and_then(|m| match FirstGoalMinute::try_from(m) {
        Ok(minute) => Some(minute),
        Err(_) => {
            warn!("round {} has an out-of-range first-goal minute {m}", row.id);
            None
        }
    });
    RoundResult {
        id: row.id.clone(),
        created_at: row.created_at,
        matchday: row.matchday,
        picks: Vec::new(),
        total_points: row.total_points,
        first_goal_minute,
    }
}
