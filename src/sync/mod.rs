//! Best-effort reconciliation of the local store with the remote backend.
//!
//! `bootstrap` pulls every collection, merges it into the local store (remote wins
//! per key) and pushes the merged result back. The `sync_*` calls push one
//! collection after a local change. The local store stays authoritative: a failed
//! pull or push leaves local data untouched and is only logged by the caller.

pub mod merge;
pub mod worker;

use crate::auth::IdentityProvider;
use crate::error::{Result, StoreResult};
use crate::league::League;
use crate::remote::{ProfileRow, RemoteBackend};
use crate::store::LocalStore;
use chrono::Utc;
use futures_util::join;
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profile,
    Predictions,
    Rounds,
    Leagues,
    Leaderboard,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Profile => "profile",
            Collection::Predictions => "predictions",
            Collection::Rounds => "rounds",
            Collection::Leagues => "leagues",
            Collection::Leaderboard => "leaderboard",
        };
        f.write_str(name)
    }
}

/// Collections whose pull-merge-push failed during a bootstrap.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub failed: Vec<Collection>,
}

impl BootstrapReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One lock per collection so a pull-merge-push never interleaves with another
/// operation on the same collection.
#[derive(Default)]
struct CollectionLocks {
    user_id: Mutex<()>,
    profile: Mutex<()>,
    predictions: Mutex<()>,
    rounds: Mutex<()>,
    leagues: Mutex<()>,
    leaderboard: Mutex<()>,
}

pub struct SyncReconciler {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteBackend>,
    identity: Arc<dyn IdentityProvider>,
    locks: CollectionLocks,
}

impl SyncReconciler {
    pub fn new(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteBackend>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self { store, remote, identity, locks: CollectionLocks::default() }
    }

    /// The authenticated identity when there is one, else the id stored on this
    /// device, else a fresh one. Whatever is returned is persisted.
    pub async fn get_or_create_user_id(&self) -> StoreResult<String> {
        let _guard = self.locks.user_id.lock().await;
        if let Some(id) = self.identity.current_user_id().await {
            if self.store.load_user_id().as_deref() != Some(id.as_str()) {
                self.store.save_user_id(&id)?;
            }
            return Ok(id);
        }
        if let Some(id) = self.store.load_user_id() {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        debug!("created device user id {id}");
        self.store.save_user_id(&id)?;
        Ok(id)
    }

    /// Reconcile all five collections concurrently. Returns once every one has
    /// finished, successfully or not.
    pub async fn bootstrap(&self) -> Result<BootstrapReport> {
        let user_id = self.get_or_create_user_id().await?;
        let user_id = user_id.as_str();

        let (profile, predictions, rounds, leagues, leaderboard) = join!(
            self.reconcile_profile(user_id),
            self.reconcile_predictions(user_id),
            self.reconcile_rounds(user_id),
            self.reconcile_leagues(user_id),
            self.reconcile_leaderboard(user_id),
        );

        let mut report = BootstrapReport::default();
        for (collection, outcome) in [
            (Collection::Profile, profile),
            (Collection::Predictions, predictions),
            (Collection::Rounds, rounds),
            (Collection::Leagues, leagues),
            (Collection::Leaderboard, leaderboard),
        ] {
            if let Err(e) = outcome {
                if e.is_not_configured() {
                    debug!("bootstrap of {collection} skipped: {e}");
                } else {
                    warn!("bootstrap of {collection} failed: {e}");
                }
                report.failed.push(collection);
            }
        }
        info!("bootstrap finished for {user_id}, {} collection(s) failed", report.failed.len());
        Ok(report)
    }

    pub async fn sync(&self, collection: Collection) -> Result<()> {
        match collection {
            Collection::Profile => self.sync_profile().await,
            Collection::Predictions => self.sync_predictions().await,
            Collection::Rounds => self.sync_rounds().await,
            Collection::Leagues => self.sync_leagues().await,
            Collection::Leaderboard => self.sync_leaderboard().await,
        }
    }

    pub async fn sync_profile(&self) -> Result<()> {
        let user_id = self.get_or_create_user_id().await?;
        let _guard = self.locks.profile.lock().await;
        self.push_profile(&user_id, self.store.load_profile_name()).await
    }

    pub async fn sync_predictions(&self) -> Result<()> {
        let user_id = self.get_or_create_user_id().await?;
        let _guard = self.locks.predictions.lock().await;
        let rows = merge::prediction_rows(&user_id, &self.store.load_predictions());
        self.remote.replace_predictions(&user_id, &rows).await?;
        Ok(())
    }

    pub async fn sync_rounds(&self) -> Result<()> {
        let user_id = self.get_or_create_user_id().await?;
        let _guard = self.locks.rounds.lock().await;
        let rows = merge::round_rows(&user_id, &self.store.load_rounds());
        self.remote.replace_rounds(&user_id, &rows).await?;
        Ok(())
    }

    pub async fn sync_leagues(&self) -> Result<()> {
        let user_id = self.get_or_create_user_id().await?;
        let _guard = self.locks.leagues.lock().await;
        self.push_leagues(&user_id, &self.store.load_leagues()).await
    }

    pub async fn sync_leaderboard(&self) -> Result<()> {
        let user_id = self.get_or_create_user_id().await?;
        let _guard = self.locks.leaderboard.lock().await;
        self.push_leaderboard(&user_id).await
    }

    // -----------------------------------------------------------------------
    // Pull, merge, push
    // -----------------------------------------------------------------------

    async fn reconcile_profile(&self, user_id: &str) -> Result<()> {
        let _guard = self.locks.profile.lock().await;
        let remote = self.remote.fetch_profile(user_id).await?;
        let local = self.store.load_profile_name();
        let remote_name = remote.as_ref().and_then(|p| p.name.as_deref());
        let merged = merge::merge_profile_name(local.clone(), remote_name);
        if merged != local {
            self.store.save_profile_name(&merged)?;
        }
        self.push_profile(user_id, merged).await
    }

    async fn reconcile_predictions(&self, user_id: &str) -> Result<()> {
        let _guard = self.locks.predictions.lock().await;
        let remote = self.remote.fetch_predictions(user_id).await?;
        let merged = self
            .store
            .update_predictions(|local| merge::merge_predictions(local, &remote))?;
        let rows = merge::prediction_rows(user_id, &merged);
        self.remote.replace_predictions(user_id, &rows).await?;
        Ok(())
    }

    async fn reconcile_rounds(&self, user_id: &str) -> Result<()> {
        let _guard = self.locks.rounds.lock().await;
        let remote = self.remote.fetch_rounds(user_id).await?;
        let merged = self.store.update_rounds(|local| merge::merge_rounds(local, &remote))?;
        let rows = merge::round_rows(user_id, &merged);
        self.remote.replace_rounds(user_id, &rows).await?;
        Ok(())
    }

    async fn reconcile_leagues(&self, user_id: &str) -> Result<()> {
        let _guard = self.locks.leagues.lock().await;
        let remote = self.remote.fetch_memberships(user_id).await?;
        let merged = self.store.update_leagues(|local| merge::merge_leagues(local, &remote))?;
        self.push_leagues(user_id, &merged).await
    }

    async fn reconcile_leaderboard(&self, user_id: &str) -> Result<()> {
        let _guard = self.locks.leaderboard.lock().await;
        let remote = self.remote.fetch_leaderboard(user_id).await?;
        self.store
            .update_leaderboard(|local| merge::merge_leaderboard(local, remote.as_ref()))?;
        self.push_leaderboard(user_id).await
    }

    // -----------------------------------------------------------------------
    // Pushes (callers hold the collection lock)
    // -----------------------------------------------------------------------

    async fn push_profile(&self, user_id: &str, name: String) -> Result<()> {
        let row = ProfileRow { id: user_id.to_owned(), name: Some(name) };
        self.remote.upsert_profile(&row).await?;
        Ok(())
    }

    /// Resolve each league's remote id by code, creating unknown leagues, then
    /// make the user's memberships match.
    async fn push_leagues(&self, user_id: &str, leagues: &[League]) -> Result<()> {
        let mut league_ids: Vec<String> = Vec::with_capacity(leagues.len());
        for league in leagues {
            let id = match self.remote.find_league_id(&league.code).await? {
                Some(id) => id,
                None => {
                    debug!("creating remote league {}", league.code);
                    self.remote.create_league(&league.name, &league.code).await?
                }
            };
            if !league_ids.contains(&id) {
                league_ids.push(id);
            }
        }
        self.remote.replace_memberships(user_id, &league_ids).await?;
        Ok(())
    }

    async fn push_leaderboard(&self, user_id: &str) -> Result<()> {
        let entries = self.store.load_leaderboard();
        let Some(row) = merge::leaderboard_row(user_id, &entries, Utc::now()) else {
            debug!("no local leaderboard entry to push");
            return Ok(());
        };
        self.remote.upsert_leaderboard(&row).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BypassAuth;
    use crate::error::{Error, RemoteError};
    use crate::leaderboard::LeaderboardEntry;
    use crate::remote::memory::{LeagueRecord, MemoryRemote};
    use crate::remote::{Disconnected, PredictionRow, RoundRow};
    use crate::round::RoundResult;
    use crate::scoring::{Prediction, Predictions};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct FixedIdentity(&'static str);

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn current_user_id(&self) -> Option<String> {
            Some(self.0.to_owned())
        }
        fn access_token(&self) -> Option<String> {
            None
        }
        fn is_authenticated(&self) -> bool {
            true
        }
        async fn sign_in(&self, _: &str, _: &str) -> std::result::Result<(), crate::error::AuthError> {
            Ok(())
        }
        async fn sign_up(&self, _: &str, _: &str) -> std::result::Result<(), crate::error::AuthError> {
            Ok(())
        }
        async fn sign_out(&self) -> std::result::Result<(), crate::error::AuthError> {
            Ok(())
        }
    }

    fn reconciler(remote: Arc<MemoryRemote>) -> (SyncReconciler, Arc<LocalStore>) {
        let store = Arc::new(LocalStore::in_memory());
        let sync = SyncReconciler::new(store.clone(), remote, Arc::new(FixedIdentity("user-1")));
        (sync, store)
    }

    fn round(id: &str, matchday: u32, total: u32, age_hours: i64) -> RoundResult {
        RoundResult {
            id: id.into(),
            created_at: Utc.with_ymd_and_hms(2025, 12, 30, 22, 0, 0).unwrap() - Duration::hours(age_hours),
            matchday,
            picks: vec![],
            total_points: total,
            first_goal_minute: None,
        }
    }

    #[tokio::test]
    async fn device_id_is_created_once() {
        let store = Arc::new(LocalStore::in_memory());
        let sync = SyncReconciler::new(store.clone(), Arc::new(Disconnected), Arc::new(BypassAuth::new()));

        let first = sync.get_or_create_user_id().await.unwrap();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(sync.get_or_create_user_id().await.unwrap(), first);
        assert_eq!(store.load_user_id(), Some(first));
    }

    #[tokio::test]
    async fn authenticated_identity_replaces_device_id() {
        let remote = Arc::new(MemoryRemote::new());
        let (sync, store) = reconciler(remote);
        store.save_user_id("device-id").unwrap();

        assert_eq!(sync.get_or_create_user_id().await.unwrap(), "user-1");
        assert_eq!(store.load_user_id().as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn bootstrap_merges_and_pushes_every_collection() {
        let remote = Arc::new(MemoryRemote::new());
        remote
            .replace_predictions("user-1", &[PredictionRow { user_id: "user-1".into(), match_id: 101, home: 3, away: 1 }])
            .await
            .unwrap();
        remote
            .replace_rounds(
                "user-1",
                &[RoundRow {
                    id: "round-remote".into(),
                    user_id: "user-1".into(),
                    matchday: 11,
                    total_points: 9,
                    first_goal_minute: Some(12),
                    created_at: round("x", 11, 0, 30).created_at,
                }],
            )
            .await
            .unwrap();
        remote.seed_membership(
            "user-1",
            LeagueRecord { id: "50".into(), name: "Office".into(), code: "B6-500".into() },
        );
        remote
            .upsert_profile(&ProfileRow { id: "user-1".into(), name: Some("Remote Sam".into()) })
            .await
            .unwrap();

        let (sync, store) = reconciler(remote.clone());
        let mut predictions = Predictions::new();
        predictions.insert(101, Prediction::new(0, 0));
        predictions.insert(102, Prediction::new(2, 1));
        store.save_predictions(&predictions).unwrap();
        store.save_rounds(&[round("round-local", 12, 7, 1)]).unwrap();
        store
            .save_leagues(&[League { id: "league-1".into(), name: "Mine".into(), code: "B6-123".into(), members: 1 }])
            .unwrap();
        store.save_leaderboard(&[LeaderboardEntry::you(7, 7)]).unwrap();
        store.save_profile_name("Sam").unwrap();

        let report = sync.bootstrap().await.unwrap();
        assert!(report.is_complete(), "{:?}", report.failed);

        let merged = store.load_predictions();
        assert_eq!(merged[&101], Prediction::new(3, 1));
        assert_eq!(merged[&102], Prediction::new(2, 1));
        assert_eq!(remote.predictions_of("user-1").len(), 2);

        let ids: Vec<String> = store.load_rounds().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["round-local", "round-remote"]);
        assert_eq!(remote.rounds_of("user-1").len(), 2);

        assert_eq!(store.load_leagues().len(), 2);
        assert_eq!(remote.league_codes_of("user-1"), vec!["B6-123", "B6-500"]);

        assert_eq!(store.load_profile_name(), "Remote Sam");
        assert_eq!(remote.leaderboard_of("user-1").and_then(|r| r.total_points), Some(7));
    }

    #[tokio::test]
    async fn bootstrap_keeps_remote_rounds_for_a_locally_played_matchday() {
        let remote = Arc::new(MemoryRemote::new());
        let older = round("round-remote", 12, 9, 1);
        remote
            .replace_rounds("user-1", &merge::round_rows("user-1", &[older]))
            .await
            .unwrap();
        let (sync, store) = reconciler(remote.clone());
        store.save_rounds(&[round("round-local", 12, 4, 0)]).unwrap();

        sync.bootstrap().await.unwrap();

        let ids: Vec<String> = store.load_rounds().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["round-local", "round-remote"]);
        assert_eq!(remote.rounds_of("user-1").len(), 2);
    }

    #[tokio::test]
    async fn remote_leaderboard_row_wins_on_bootstrap() {
        let remote = Arc::new(MemoryRemote::new());
        remote
            .upsert_leaderboard(&crate::remote::LeaderboardRow {
                user_id: "user-1".into(),
                total_points: Some(55),
                weekly_points: Some(5),
                updated_at: None,
            })
            .await
            .unwrap();
        let (sync, store) = reconciler(remote);
        store.save_leaderboard(&[LeaderboardEntry::you(7, 7)]).unwrap();

        sync.bootstrap().await.unwrap();
        assert_eq!(store.load_leaderboard(), vec![LeaderboardEntry::you(55, 5)]);
    }

    #[tokio::test]
    async fn offline_bootstrap_leaves_local_state_alone() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let (sync, store) = reconciler(remote);
        store.save_rounds(&[round("round-local", 12, 7, 1)]).unwrap();

        let report = sync.bootstrap().await.unwrap();
        assert_eq!(report.failed.len(), 5);
        assert_eq!(store.load_rounds().len(), 1);

        let err = sync.sync_rounds().await.unwrap_err();
        assert!(matches!(err, Error::Remote(RemoteError::Other(_))));
    }

    #[tokio::test]
    async fn pushes_replace_the_remote_collection() {
        let remote = Arc::new(MemoryRemote::new());
        let (sync, store) = reconciler(remote.clone());

        store.save_rounds(&[round("round-a", 1, 3, 2), round("round-b", 2, 4, 1)]).unwrap();
        sync.sync_rounds().await.unwrap();
        assert_eq!(remote.rounds_of("user-1").len(), 2);

        store.save_rounds(&[round("round-b", 2, 4, 1)]).unwrap();
        sync.sync_rounds().await.unwrap();
        sync.sync_rounds().await.unwrap();
        let rows = remote.rounds_of("user-1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "round-b");
    }

    #[tokio::test]
    async fn league_push_reuses_known_codes() {
        let remote = Arc::new(MemoryRemote::new());
        remote.seed_membership(
            "someone-else",
            LeagueRecord { id: "1".into(), name: "Office".into(), code: "B6-321".into() },
        );
        let (sync, store) = reconciler(remote.clone());
        store
            .save_leagues(&[League::join("B6-321", Utc::now()).unwrap()])
            .unwrap();

        sync.sync_leagues().await.unwrap();
        assert_eq!(remote.leagues().len(), 1);
        assert_eq!(remote.league_codes_of("user-1"), vec!["B6-321"]);
    }
}
