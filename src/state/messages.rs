use crate::state::network::LoadingState;
use football_data_api::{Match, Standings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRequest {
    LoadFixtures { competition: String, matchday: u32 },
    LoadStandings { competition: String, season: i32 },
    LoadTeamResults { team_id: String, limit: u32 },
    /// Abort every fixture request still in flight.
    Cancel,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    FixturesLoaded { matchday: u32, matches: Vec<Match> },
    StandingsLoaded { standings: Standings },
    TeamResultsLoaded { team_id: String, matches: Vec<Match> },
    Error { request: NetworkRequest, message: String },
}
