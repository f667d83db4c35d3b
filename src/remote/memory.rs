use super::{
    LeaderboardRow, LeagueInfo, MembershipRow, PredictionRow, ProfileRow, RemoteBackend, RoundRow,
};
use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRecord {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<String, ProfileRow>,
    predictions: Vec<PredictionRow>,
    rounds: Vec<RoundRow>,
    leagues: Vec<LeagueRecord>,
    members: Vec<(String, String)>, // (league_id, user_id)
    leaderboard: HashMap<String, LeaderboardRow>,
}

/// Backend held in process memory. Useful for tests and for local play against a
/// shared in-process "server"; `set_offline` makes every call fail.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<Tables>,
    offline: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn tables(&self) -> RemoteResult<MutexGuard<'_, Tables>> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(RemoteError::Other("backend unreachable".into()));
        }
        Ok(self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    fn snapshot(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn predictions_of(&self, user_id: &str) -> Vec<PredictionRow> {
        let mut rows: Vec<PredictionRow> = self
            .snapshot()
            .predictions
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.match_id);
        rows
    }

    pub fn rounds_of(&self, user_id: &str) -> Vec<RoundRow> {
        self.snapshot().rounds.iter().filter(|r| r.user_id == user_id).cloned().collect()
    }

    pub fn leagues(&self) -> Vec<LeagueRecord> {
        self.snapshot().leagues.clone()
    }

    /// Codes of the leagues `user_id` belongs to, sorted.
    pub fn league_codes_of(&self, user_id: &str) -> Vec<String> {
        let tables = self.snapshot();
        let mut codes: Vec<String> = tables
            .members
            .iter()
            .filter(|(_, member)| member == user_id)
            .filter_map(|(league_id, _)| tables.leagues.iter().find(|l| &l.id == league_id))
            .map(|l| l.code.clone())
            .collect();
        codes.sort();
        codes
    }

    pub fn leaderboard_of(&self, user_id: &str) -> Option<LeaderboardRow> {
        self.snapshot().leaderboard.get(user_id).cloned()
    }

    pub fn profile_of(&self, user_id: &str) -> Option<ProfileRow> {
        self.snapshot().profiles.get(user_id).cloned()
    }

    /// Add a league and membership directly, as another device would have.
    pub fn seed_membership(&self, user_id: &str, league: LeagueRecord) {
        let mut tables = self.snapshot();
        tables.members.push((league.id.clone(), user_id.to_owned()));
        tables.leagues.push(league);
    }
}

#[async_trait]
impl RemoteBackend for MemoryRemote {
    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<Option<ProfileRow>> {
        Ok(self.tables()?.profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, row: &ProfileRow) -> RemoteResult<()> {
        self.tables()?.profiles.insert(row.id.clone(), row.clone());
        Ok(())
    }

    async fn fetch_predictions(&self, user_id: &str) -> RemoteResult<Vec<PredictionRow>> {
        Ok(self.tables()?.predictions.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn replace_predictions(&self, user_id: &str, rows: &[PredictionRow]) -> RemoteResult<()> {
        let mut tables = self.tables()?;
        tables.predictions.retain(|r| r.user_id != user_id);
        tables.predictions.extend(rows.iter().cloned());
        Ok(())
    }

    async fn fetch_rounds(&self, user_id: &str) -> RemoteResult<Vec<RoundRow>> {
        Ok(self.tables()?.rounds.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn replace_rounds(&self, user_id: &str, rows: &[RoundRow]) -> RemoteResult<()> {
        let mut tables = self.tables()?;
        tables.rounds.retain(|r| r.user_id != user_id);
        tables.rounds.extend(rows.iter().cloned());
        Ok(())
    }

    async fn fetch_memberships(&self, user_id: &str) -> RemoteResult<Vec<MembershipRow>> {
        let tables = self.tables()?;
        Ok(tables
            .members
            .iter()
            .filter(|(_, member)| member == user_id)
            .map(|(league_id, _)| MembershipRow {
                league_id: league_id.clone(),
                league: tables.leagues.iter().find(|l| &l.id == league_id).map(|l| LeagueInfo {
                    name: Some(l.name.clone()),
                    code: Some(l.code.clone()),
                }),
            })
            .collect())
    }

    async fn find_league_id(&self, code: &str) -> RemoteResult<Option<String>> {
        Ok(self.tables()?.leagues.iter().find(|l| l.code == code).map(|l| l.id.clone()))
    }

    async fn create_league(&self, name: &str, code: &str) -> RemoteResult<String> {
        let mut tables = self.tables()?;
        let id = (tables.leagues.len() + 1).to_string();
        tables.leagues.push(LeagueRecord { id: id.clone(), name: name.to_owned(), code: code.to_owned() });
        Ok(id)
    }

    async fn replace_memberships(&self, user_id: &str, league_ids: &[String]) -> RemoteResult<()> {
        let mut tables = self.tables()?;
        tables.members.retain(|(_, member)| member != user_id);
        tables
            .members
            .extend(league_ids.iter().map(|id| (id.clone(), user_id.to_owned())));
        Ok(())
    }

    async fn fetch_leaderboard(&self, user_id: &str) -> RemoteResult<Option<LeaderboardRow>> {
        Ok(self.tables()?.leaderboard.get(user_id).cloned())
    }

    async fn upsert_leaderboard(&self, row: &LeaderboardRow) -> RemoteResult<()> {
        self.tables()?.leaderboard.insert(row.user_id.clone(), row.clone());
        Ok(())
    }
}
