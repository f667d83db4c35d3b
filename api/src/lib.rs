pub mod client;
pub mod wire;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the football-data wire format
// ---------------------------------------------------------------------------

/// Number of fixtures that make up one playable slate.
pub const SLATE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    pub utc_date: DateTime<Utc>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matchday: Option<u32>,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<MatchScore>,
}

impl Match {
    /// Final scoreline, only when both sides are known.
    pub fn result(&self) -> Option<Scoreline> {
        let full_time = self.score.as_ref()?.full_time.as_ref()?;
        Some(Scoreline { home: full_time.home?, away: full_time.away? })
    }

    pub fn kickoff_passed(&self, now: DateTime<Utc>) -> bool {
        self.utc_date <= now
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team.id == team_id || self.away_team.id == team_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_time: Option<FullTime>,
}

/// Full-time goals as reported upstream; either side may still be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTime {
    pub home: Option<u8>,
    pub away: Option<u8>,
}

/// A known scoreline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u8,
    pub away: u8,
}

impl Scoreline {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::AwayWin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
}

impl MatchStatus {
    /// Fold an upstream status string into the app's status set.
    /// AWARDED and POSTPONED count as settled; anything unknown is upcoming.
    pub fn from_upstream(raw: &str) -> Self {
        match raw {
            "FINISHED" | "AWARDED" | "POSTPONED" => MatchStatus::Finished,
            "IN_PLAY" | "PAUSED" => MatchStatus::InPlay,
            _ => MatchStatus::Scheduled,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::InPlay | MatchStatus::Paused)
    }

    pub fn is_finished(&self) -> bool {
        *self == MatchStatus::Finished
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(self, MatchStatus::Scheduled | MatchStatus::Timed)
    }
}

/// League table positions keyed by team id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standings {
    pub positions: HashMap<String, u32>,
}

impl Standings {
    pub fn position_of(&self, team_id: &str) -> Option<u32> {
        self.positions.get(team_id).copied()
    }
}

/// One finished game from a team's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLine {
    pub opponent: String,
    pub home_score: u8,
    pub away_score: u8,
    pub outcome: FormOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Win,
    Draw,
    Loss,
}

impl FormOutcome {
    pub fn letter(&self) -> char {
        match self {
            FormOutcome::Win => 'W',
            FormOutcome::Draw => 'D',
            FormOutcome::Loss => 'L',
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Build the playable slate: keep fixtures on `on_date` (if given), pick up to
/// `count` at random, then order them by kickoff.
pub fn select_slate<R: Rng + ?Sized>(
    matches: Vec<Match>,
    on_date: Option<NaiveDate>,
    count: usize,
    rng: &mut R,
) -> Vec<Match> {
    let mut candidates: Vec<Match> = matches
        .into_iter()
        .filter(|m| on_date.is_none_or(|day| m.utc_date.date_naive() == day))
        .collect();
    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates.sort_by_key(|m| m.utc_date);
    candidates
}

/// Recent results for `team_id`, newest first, skipping games without a final score.
pub fn recent_form(matches: &[Match], team_id: &str) -> Vec<FormLine> {
    let mut finished: Vec<&Match> = matches
        .iter()
        .filter(|m| m.status.is_finished() && m.involves(team_id))
        .collect();
    finished.sort_by(|a, b| b.utc_date.cmp(&a.utc_date));

    finished
        .into_iter()
        .filter_map(|m| {
            let result = m.result()?;
            let at_home = m.home_team.id == team_id;
            let (ours, theirs, opponent) = if at_home {
                (result.home, result.away, &m.away_team)
            } else {
                (result.away, result.home, &m.home_team)
            };
            let outcome = match ours.cmp(&theirs) {
                std::cmp::Ordering::Greater => FormOutcome::Win,
                std::cmp::Ordering::Equal => FormOutcome::Draw,
                std::cmp::Ordering::Less => FormOutcome::Loss,
            };
            Some(FormLine {
                opponent: opponent.name.clone(),
                home_score: result.home,
                away_score: result.away,
                outcome,
            })
        })
        .collect()
}

/// Finished meetings between two teams, taken from one team's match history.
pub fn head_to_head<'a>(history: &'a [Match], home_id: &str, away_id: &str) -> Vec<&'a Match> {
    history
        .iter()
        .filter(|m| m.status.is_finished() && m.involves(home_id) && m.involves(away_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fixture(id: u64, day: u32, hour: u32, home: &str, away: &str) -> Match {
        Match {
            id,
            utc_date: Utc.with_ymd_and_hms(2025, 12, day, hour, 0, 0).unwrap(),
            status: MatchStatus::Scheduled,
            matchday: Some(19),
            home_team: Team { id: home.into(), name: home.to_uppercase(), ..Default::default() },
            away_team: Team { id: away.into(), name: away.to_uppercase(), ..Default::default() },
            score: None,
        }
    }

    fn finished(mut m: Match, home: u8, away: u8) -> Match {
        m.status = MatchStatus::Finished;
        m.score = Some(MatchScore {
            full_time: Some(FullTime { home: Some(home), away: Some(away) }),
        });
        m
    }

    #[test]
    fn status_folding() {
        assert_eq!(MatchStatus::from_upstream("AWARDED"), MatchStatus::Finished);
        assert_eq!(MatchStatus::from_upstream("POSTPONED"), MatchStatus::Finished);
        assert_eq!(MatchStatus::from_upstream("PAUSED"), MatchStatus::InPlay);
        assert_eq!(MatchStatus::from_upstream("TIMED"), MatchStatus::Scheduled);
        assert_eq!(MatchStatus::from_upstream("SUSPENDED"), MatchStatus::Scheduled);
    }

    #[test]
    fn result_requires_both_sides() {
        let mut m = fixture(1, 30, 12, "57", "61");
        assert_eq!(m.result(), None);
        m.score = Some(MatchScore {
            full_time: Some(FullTime { home: Some(1), away: None }),
        });
        assert_eq!(m.result(), None);
        let m = finished(m, 2, 1);
        assert_eq!(m.result(), Some(Scoreline::new(2, 1)));
    }

    #[test]
    fn status_serializes_in_upstream_spelling() {
        let json = serde_json::to_string(&MatchStatus::InPlay).unwrap();
        assert_eq!(json, "\"IN_PLAY\"");
    }

    #[test]
    fn slate_filters_by_date_and_sorts_by_kickoff() {
        let matches = vec![
            fixture(1, 30, 20, "a", "b"),
            fixture(2, 30, 12, "c", "d"),
            fixture(3, 29, 15, "e", "f"),
            fixture(4, 30, 17, "g", "h"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let day = NaiveDate::from_ymd_opt(2025, 12, 30);
        let slate = select_slate(matches, day, SLATE_SIZE, &mut rng);

        let ids: Vec<u64> = slate.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }

    #[test]
    fn slate_is_capped() {
        let matches: Vec<Match> = (0..10).map(|i| fixture(i, 30, i as u32, "x", "y")).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let slate = select_slate(matches, None, SLATE_SIZE, &mut rng);
        assert_eq!(slate.len(), SLATE_SIZE);
        assert!(slate.windows(2).all(|w| w[0].utc_date <= w[1].utc_date));
    }

    #[test]
    fn form_is_from_the_team_perspective() {
        let history = vec![
            finished(fixture(1, 20, 12, "57", "61"), 2, 0),
            finished(fixture(2, 27, 12, "64", "57"), 3, 1),
            fixture(3, 30, 12, "57", "65"),
        ];
        let form = recent_form(&history, "57");
        assert_eq!(form.len(), 2);
        assert_eq!(form[0].outcome, FormOutcome::Loss);
        assert_eq!(form[0].opponent, "64");
        assert_eq!(form[1].outcome.letter(), 'W');
    }

    #[test]
    fn head_to_head_keeps_only_shared_finished_games() {
        let history = vec![
            finished(fixture(1, 20, 12, "57", "61"), 2, 0),
            finished(fixture(2, 21, 12, "61", "57"), 1, 1),
            finished(fixture(3, 22, 12, "57", "64"), 0, 0),
            fixture(4, 30, 12, "57", "61"),
        ];
        let ids: Vec<u64> = head_to_head(&history, "57", "61").iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
