use crate::wire::{MatchesResponse, RawMatch, RawTeam, StandingsResponse};
use crate::{FullTime, Match, MatchScore, MatchStatus, Standings, Team};
use chrono::{DateTime, Datelike, Utc};
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const FOOTBALL_DATA_V4: &str = "https://api.football-data.org/v4";
pub const DEFAULT_COMPETITION: &str = "PL";

/// Where fixture requests go: straight to football-data.org with a key, or through
/// the same-shaped proxy that holds the key server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Direct { base_url: String, api_key: String },
    Proxy { url: String },
}

/// football-data.org v4 client.
#[derive(Debug, Clone)]
pub struct FootballDataApi {
    client: Client,
    timeout: Duration,
    endpoint: Endpoint,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "Fixtures request failed for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// A fixture the upstream returned that cannot become a [`Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingField(&'static str),
    InvalidDate(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingField(field) => write!(f, "fixture is missing `{field}`"),
            ParseError::InvalidDate(raw) => write!(f, "fixture has an invalid utcDate: {raw}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl FootballDataApi {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            client: Client::builder()
                .user_agent("best6/0.1 (score predictions)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            endpoint,
        }
    }

    pub fn direct(api_key: impl Into<String>) -> Self {
        Self::new(Endpoint::Direct {
            base_url: FOOTBALL_DATA_V4.to_owned(),
            api_key: api_key.into(),
        })
    }

    pub fn proxy(url: impl Into<String>) -> Self {
        Self::new(Endpoint::Proxy { url: url.into() })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fixtures for one matchday of a competition. Fixtures that fail to parse
    /// are dropped.
    pub async fn fetch_matchday(&self, competition: &str, matchday: u32) -> ApiResult<Vec<Match>> {
        let path = format!("competitions/{competition}/matches?matchday={matchday}");
        let raw: MatchesResponse = self.get(&path).await?;
        Ok(parse_matches(raw.matches))
    }

    /// Overall league table positions for a season (e.g. 2025 for 2025/26).
    pub async fn fetch_standings(&self, competition: &str, season: i32) -> ApiResult<Standings> {
        let path = format!("competitions/{competition}/standings?season={season}");
        let raw: StandingsResponse = self.get(&path).await?;
        Ok(map_standings(raw))
    }

    /// A team's most recent finished matches.
    pub async fn fetch_team_results(&self, team_id: &str, limit: u32) -> ApiResult<Vec<Match>> {
        let path = format!("teams/{team_id}/matches?status=FINISHED&limit={limit}");
        let raw: MatchesResponse = self.get(&path).await?;
        Ok(parse_matches(raw.matches))
    }

    fn url_for(&self, path: &str) -> ApiResult<Url> {
        if path.contains("..") {
            return Err(ApiError::Other(format!("invalid path: {path}")));
        }
        let url = match &self.endpoint {
            Endpoint::Direct { base_url, .. } => {
                Url::parse(&format!("{}/{path}", base_url.trim_end_matches('/')))
            }
            Endpoint::Proxy { url } => Url::parse_with_params(url, &[("path", path)]),
        };
        url.map_err(|e| ApiError::Other(format!("bad fixtures url for {path}: {e}")))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url_for(path)?;
        let url_str = url.to_string();
        debug!("GET {url_str}");

        let mut request = self.client.get(url).timeout(self.timeout);
        if let Endpoint::Direct { api_key, .. } = &self.endpoint {
            if api_key.trim().is_empty() {
                return Err(ApiError::Other("missing API key for fixtures".into()));
            }
            request = request.header("X-Auth-Token", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_str.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url_str)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                Err(ApiError::NotFound(url_str))
            }
            Err(e) => Err(ApiError::Api(e, url_str)),
        }
    }
}

/// Season label year: August onwards belongs to the season starting this year.
pub fn season_for(now: DateTime<Utc>) -> i32 {
    if now.month() >= 8 { now.year() } else { now.year() - 1 }
}

// ---------------------------------------------------------------------------
// Mapping: football-data wire types → clean domain types
// ---------------------------------------------------------------------------

/// Parse one upstream fixture. `id` and a valid `utcDate` are required; team
/// fields fall back to placeholders.
pub fn parse_match(raw: RawMatch) -> Result<Match, ParseError> {
    let id = raw.id.ok_or(ParseError::MissingField("id"))?;
    let utc_raw = raw.utc_date.ok_or(ParseError::MissingField("utcDate"))?;
    let utc_date = DateTime::parse_from_rfc3339(&utc_raw)
        .map_err(|_| ParseError::InvalidDate(utc_raw.clone()))?
        .with_timezone(&Utc);

    let status = raw
        .status
        .as_deref()
        .map(MatchStatus::from_upstream)
        .unwrap_or_default();

    let score = raw.score.and_then(|s| s.full_time).map(|ft| MatchScore {
        full_time: Some(FullTime { home: ft.home, away: ft.away }),
    });

    Ok(Match {
        id,
        utc_date,
        status,
        matchday: raw.matchday,
        home_team: map_team(raw.home_team, "HOME", "Home"),
        away_team: map_team(raw.away_team, "AWAY", "Away"),
        score,
    })
}

fn parse_matches(raw: Vec<RawMatch>) -> Vec<Match> {
    raw.into_iter()
        .filter_map(|m| match parse_match(m) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("skipping fixture: {e}");
                None
            }
        })
        .collect()
}

fn map_team(raw: Option<RawTeam>, fallback_id: &str, fallback_name: &str) -> Team {
    let raw = raw.unwrap_or_default();
    Team {
        id: raw.id.map(|id| id.to_string()).unwrap_or_else(|| fallback_id.to_owned()),
        name: raw.name.unwrap_or_else(|| fallback_name.to_owned()),
        short_name: raw.short_name.or(raw.tla),
        crest: raw.crest,
    }
}

fn map_standings(raw: StandingsResponse) -> Standings {
    let positions = raw
        .standings
        .into_iter()
        .next()
        .map(|standing| {
            standing
                .table
                .into_iter()
                .filter_map(|row| {
                    let team_id = row.team?.id?;
                    Some((team_id.to_string(), row.position?))
                })
                .collect()
        })
        .unwrap_or_default();
    Standings { positions }
}
