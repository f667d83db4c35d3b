//! The remote backend: a relational store consulted through whole-collection
//! reads and replaces, one user at a time.

pub mod memory;
pub mod rest;

use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Row shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub user_id: String,
    pub match_id: u64,
    pub home: u8,
    pub away: u8,
}

/// Aggregate only: per-pick detail never leaves the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRow {
    pub id: String,
    pub user_id: String,
    pub matchday: u32,
    pub total_points: u32,
    pub first_goal_minute: Option<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeagueRow {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: Option<String>,
    pub code: Option<String>,
}

/// A `league_members` row joined with the league it points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MembershipRow {
    #[serde(deserialize_with = "id_as_string")]
    pub league_id: String,
    #[serde(default, rename = "leagues")]
    pub league: Option<LeagueInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LeagueInfo {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub user_id: String,
    #[serde(default)]
    pub total_points: Option<u32>,
    #[serde(default)]
    pub weekly_points: Option<u32>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Ids come back as numbers or strings depending on the column type.
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Backend contract
// ---------------------------------------------------------------------------

/// `replace_*` calls make the user's remote rows equal to the given set: rows are
/// upserted by key first, then rows whose key is absent are deleted, so a failed
/// push never leaves the collection empty.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<Option<ProfileRow>>;
    async fn upsert_profile(&self, row: &ProfileRow) -> RemoteResult<()>;

    async fn fetch_predictions(&self, user_id: &str) -> RemoteResult<Vec<PredictionRow>>;
    async fn replace_predictions(&self, user_id: &str, rows: &[PredictionRow]) -> RemoteResult<()>;

    async fn fetch_rounds(&self, user_id: &str) -> RemoteResult<Vec<RoundRow>>;
    async fn replace_rounds(&self, user_id: &str, rows: &[RoundRow]) -> RemoteResult<()>;

    async fn fetch_memberships(&self, user_id: &str) -> RemoteResult<Vec<MembershipRow>>;
    async fn find_league_id(&self, code: &str) -> RemoteResult<Option<String>>;
    async fn create_league(&self, name: &str, code: &str) -> RemoteResult<String>;
    async fn replace_memberships(&self, user_id: &str, league_ids: &[String]) -> RemoteResult<()>;

    async fn fetch_leaderboard(&self, user_id: &str) -> RemoteResult<Option<LeaderboardRow>>;
    async fn upsert_leaderboard(&self, row: &LeaderboardRow) -> RemoteResult<()>;
}

/// Stand-in when no backend is configured: every call fails and sync degrades to
/// local-only play.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

#[async_trait]
impl RemoteBackend for Disconnected {
    async fn fetch_profile(&self, _: &str) -> RemoteResult<Option<ProfileRow>> {
        Err(RemoteError::NotConfigured)
    }
    async fn upsert_profile(&self, _: &ProfileRow) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured)
    }
    async fn fetch_predictions(&self, _: &str) -> RemoteResult<Vec<PredictionRow>> {
        Err(RemoteError::NotConfigured)
    }
    async fn replace_predictions(&self, _: &str, _: &[PredictionRow]) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured)
    }
    async fn fetch_rounds(&self, _: &str) -> RemoteResult<Vec<RoundRow>> {
        Err(RemoteError::NotConfigured)
    }
    async fn replace_rounds(&self, _: &str, _: &[RoundRow]) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured)
    }
    async fn fetch_memberships(&self, _: &str) -> RemoteResult<Vec<MembershipRow>> {
        Err(RemoteError::NotConfigured)
    }
    async fn find_league_id(&self, _: &str) -> RemoteResult<Option<String>> {
        Err(RemoteError::NotConfigured)
    }
    async fn create_league(&self, _: &str, _: &str) -> RemoteResult<String> {
        Err(RemoteError::NotConfigured)
    }
    async fn replace_memberships(&self, _: &str, _: &[String]) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured)
    }
    async fn fetch_leaderboard(&self, _: &str) -> RemoteResult<Option<LeaderboardRow>> {
        Err(RemoteError::NotConfigured)
    }
    async fn upsert_leaderboard(&self, _: &LeaderboardRow) -> RemoteResult<()> {
        Err(RemoteError::NotConfigured)
    }
}
