//! football-data.org v4 raw wire types: serde shapes for deserializing responses.
//! Every field is optional upstream; the typed parser in client.rs decides what is
//! required and what gets defaulted.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Matches  (competitions/{code}/matches, teams/{id}/matches)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    pub id: Option<u64>,
    pub utc_date: Option<String>, // ISO 8601
    pub status: Option<String>,
    pub matchday: Option<u32>,
    pub home_team: Option<RawTeam>,
    pub away_team: Option<RawTeam>,
    pub score: Option<RawScore>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawScore {
    pub full_time: Option<RawFullTime>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawFullTime {
    pub home: Option<u8>,
    pub away: Option<u8>,
}

// ---------------------------------------------------------------------------
// Standings  (competitions/{code}/standings)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StandingsResponse {
    #[serde(default)]
    pub standings: Vec<RawStanding>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawStanding {
    /// "TOTAL", "HOME" or "AWAY"; the first entry is the overall table.
    #[serde(rename = "type")]
    pub standing_type: Option<String>,
    #[serde(default)]
    pub table: Vec<RawTableRow>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawTableRow {
    pub position: Option<u32>,
    pub team: Option<RawTeam>,
}
