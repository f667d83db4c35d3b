use chrono::{DateTime, Duration, Utc};
use football_data_api::{Match, MatchStatus, Team};

pub const SAMPLE_MATCHDAY: u32 = 12;

const FIXTURES: [(u64, Side, Side); 6] = [
    (101, ("57", "Arsenal", "ARS"), ("61", "Chelsea", "CHE")),
    (102, ("64", "Liverpool", "LIV"), ("65", "Manchester City", "MCI")),
    (103, ("81", "Barcelona", "BAR"), ("86", "Real Madrid", "RMA")),
    (104, ("109", "Juventus", "JUV"), ("98", "AC Milan", "MIL")),
    (105, ("524", "PSG", "PSG"), ("5", "Bayern Munich", "BAY")),
    (106, ("73", "Tottenham", "TOT"), ("66", "Manchester United", "MUN")),
];

type Side = (&'static str, &'static str, &'static str);

/// Built-in slate played when no fixtures are configured, reachable or cached.
/// Kick-offs are one hour apart starting an hour from `now`.
pub fn sample_matches(now: DateTime<Utc>) -> Vec<Match> {
    FIXTURES
        .iter()
        .zip(1..)
        .map(|(&(id, home, away), hours)| Match {
            id,
            utc_date: now + Duration::hours(hours),
            status: MatchStatus::Scheduled,
            matchday: Some(SAMPLE_MATCHDAY),
            home_team: team(home),
            away_team: team(away),
            score: None,
        })
        .collect()
}

fn team((id, name, short_name): Side) -> Team {
    Team {
        id: id.to_owned(),
        name: name.to_owned(),
        short_name: Some(short_name.to_owned()),
        crest: Some(format!("https://crests.football-data.org/{id}.png")),
    }
}
