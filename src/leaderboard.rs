use crate::round::{FirstGoalMinute, RoundResult, season_points, weekly_points};
use chrono::{DateTime, Utc};
use football_data_api::Scoreline;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Leaderboard id of the local player.
pub const YOU_ID: &str = "you";
pub const YOU_NAME: &str = "You";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub total_points: u32,
    pub weekly_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Scoreline>>,
}

impl LeaderboardEntry {
    pub fn you(total_points: u32, weekly_points: u32) -> Self {
        Self {
            id: YOU_ID.to_owned(),
            name: YOU_NAME.to_owned(),
            total_points,
            weekly_points,
            avatar_color: None,
            predictions: None,
        }
    }

    pub fn is_you(&self) -> bool {
        self.id == YOU_ID
    }
}

/// Recompute the local player's entry from the retained rounds. Other entries are
/// left untouched; a missing "you" entry is added at the front.
pub fn with_player_totals(
    mut entries: Vec<LeaderboardEntry>,
    rounds: &[RoundResult],
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let total = season_points(rounds);
    let weekly = weekly_points(rounds, now);

    match entries.iter_mut().find(|e| e.is_you()) {
        Some(you) => {
            you.name = YOU_NAME.to_owned();
            you.total_points = total;
            you.weekly_points = weekly;
        }
        None => entries.insert(0, LeaderboardEntry::you(total, weekly)),
    }
    entries
}

/// Highest total first. Equal totals keep their stored order.
pub fn ranked(entries: &[LeaderboardEntry]) -> Vec<&LeaderboardEntry> {
    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    sorted
}

/// One player's result for a single matchday, used to settle a round table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundStanding {
    pub player_id: String,
    pub points: u32,
    pub first_goal_minute: Option<FirstGoalMinute>,
}

/// Order a matchday table: points first, then the first-goal guess closest to
/// `actual_first_goal`. Players without a guess lose the tie-break.
pub fn rank_round(standings: &mut [RoundStanding], actual_first_goal: Option<u8>) {
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| compare_guesses(a, b, actual_first_goal))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

fn compare_guesses(a: &RoundStanding, b: &RoundStanding, actual: Option<u8>) -> Ordering {
    let Some(actual) = actual else {
        return Ordering::Equal;
    };
    let distance = |s: &RoundStanding| s.first_goal_minute.map(|m| m.distance_to(actual));
    match (distance(a), distance(b)) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 30, 22, 0, 0).unwrap()
    }

    fn round(matchday: u32, total: u32, age_days: i64) -> RoundResult {
        RoundResult {
            id: format!("round-{matchday}"),
            created_at: now() - Duration::days(age_days),
            matchday,
            picks: vec![],
            total_points: total,
            first_goal_minute: None,
        }
    }

    fn rival(id: &str, total: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            id: id.into(),
            name: id.to_uppercase(),
            total_points: total,
            weekly_points: 0,
            avatar_color: Some("#ff0".into()),
            predictions: None,
        }
    }

    fn standing(id: &str, points: u32, minute: Option<u8>) -> RoundStanding {
        RoundStanding {
            player_id: id.into(),
            points,
            first_goal_minute: minute.map(|m| FirstGoalMinute::try_from(m).unwrap()),
        }
    }

    #[test]
    fn you_entry_is_added_when_missing() {
        let rounds = vec![round(12, 10, 1), round(11, 6, 10)];
        let entries = with_player_totals(vec![rival("1", 90)], &rounds, now());
        assert_eq!(entries[0], LeaderboardEntry::you(16, 10));
        assert_eq!(entries[1], rival("1", 90));
    }

    #[test]
    fn you_entry_is_recomputed_in_place() {
        let mut stale = LeaderboardEntry::you(500, 500);
        stale.avatar_color = Some("#123".into());
        let entries = with_player_totals(vec![rival("1", 90), stale], &[round(12, 5, 0)], now());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].total_points, 5);
        assert_eq!(entries[1].weekly_points, 5);
        assert_eq!(entries[1].avatar_color.as_deref(), Some("#123"));
    }

    #[test]
    fn total_grows_by_exactly_the_new_round() {
        let mut rounds = vec![round(11, 8, 3)];
        let before = with_player_totals(vec![], &rounds, now())[0].total_points;
        rounds.insert(0, round(12, 12, 0));
        let after = with_player_totals(vec![], &rounds, now())[0].total_points;
        assert_eq!(after - before, 12);
    }

    #[test]
    fn ranking_is_by_total() {
        let entries = vec![rival("a", 10), rival("b", 30), rival("c", 10)];
        let ids: Vec<&str> = ranked(&entries).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn closest_first_goal_guess_wins_a_tie() {
        let mut table = vec![
            standing("far", 12, Some(80)),
            standing("none", 12, None),
            standing("top", 15, Some(1)),
            standing("close", 12, Some(30)),
        ];
        rank_round(&mut table, Some(34));
        let ids: Vec<&str> = table.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(ids, vec!["top", "close", "far", "none"]);
    }

    #[test]
    fn ties_without_actual_minute_fall_back_to_player_id() {
        let mut table = vec![standing("b", 6, Some(10)), standing("a", 6, Some(90))];
        rank_round(&mut table, None);
        assert_eq!(table[0].player_id, "a");
    }
}
