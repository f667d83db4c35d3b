pub mod backend;

use crate::error::{StoreError, StoreResult};
use crate::leaderboard::LeaderboardEntry;
use crate::league::League;
use crate::round::{RoundResult, supersede};
use crate::scoring::Predictions;
use backend::{FileStorage, MemoryStorage, Storage};
use football_data_api::Match;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Persisted keys. Collections hold JSON; `profileName`, `userId` and `language`
/// hold the bare string.
pub mod keys {
    pub const PREDICTIONS: &str = "predictions";
    pub const ROUNDS: &str = "rounds";
    pub const LEAGUES: &str = "leagues";
    pub const LEADERBOARD: &str = "leaderboard";
    pub const PROFILE_NAME: &str = "profileName";
    pub const MATCHES: &str = "matches";
    pub const USER_ID: &str = "userId";
    pub const LANGUAGE: &str = "language";
}

/// Keys wiped on sign-out. The user id survives so an anonymous player keeps
/// their remote identity.
const APP_DATA_KEYS: [&str; 7] = [
    keys::PREDICTIONS,
    keys::ROUNDS,
    keys::LEAGUES,
    keys::LEADERBOARD,
    keys::PROFILE_NAME,
    keys::MATCHES,
    keys::LANGUAGE,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Ku,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ku => "ku",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "ku" => Some(Language::Ku),
            _ => None,
        }
    }
}

/// The app's durable state. Loads never fail: a missing or unreadable value
/// comes back as the collection's default. Read-modify-write cycles are
/// serialized by a single write lock.
pub struct LocalStore {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, write_lock: Mutex::new(()) }
    }

    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    pub fn load_predictions(&self) -> Predictions {
        self.load_json(keys::PREDICTIONS)
    }

    pub fn save_predictions(&self, predictions: &Predictions) -> StoreResult<()> {
        let _guard = self.lock();
        self.put_json(keys::PREDICTIONS, predictions)
    }

    pub fn update_predictions(
        &self,
        f: impl FnOnce(Predictions) -> Predictions,
    ) -> StoreResult<Predictions> {
        self.update(keys::PREDICTIONS, f)
    }

    /// Stored rounds, most recent first by convention only.
    pub fn load_rounds(&self) -> Vec<RoundResult> {
        self.load_json(keys::ROUNDS)
    }

    pub fn save_rounds(&self, rounds: &[RoundResult]) -> StoreResult<()> {
        let _guard = self.lock();
        self.put_json(keys::ROUNDS, &rounds)
    }

    pub fn update_rounds(
        &self,
        f: impl FnOnce(Vec<RoundResult>) -> Vec<RoundResult>,
    ) -> StoreResult<Vec<RoundResult>> {
        self.update(keys::ROUNDS, f)
    }

    /// Persist a freshly settled round, replacing any round for the same
    /// matchday, and return the updated list.
    pub fn save_round_result(&self, round: RoundResult) -> StoreResult<Vec<RoundResult>> {
        self.update_rounds(|rounds| supersede(rounds, round))
    }

    pub fn load_leagues(&self) -> Vec<League> {
        self.load_json(keys::LEAGUES)
    }

    pub fn save_leagues(&self, leagues: &[League]) -> StoreResult<()> {
        let _guard = self.lock();
        self.put_json(keys::LEAGUES, &leagues)
    }

    pub fn update_leagues(
        &self,
        f: impl FnOnce(Vec<League>) -> Vec<League>,
    ) -> StoreResult<Vec<League>> {
        self.update(keys::LEAGUES, f)
    }

    pub fn load_leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.load_json(keys::LEADERBOARD)
    }

    pub fn save_leaderboard(&self, entries: &[LeaderboardEntry]) -> StoreResult<()> {
        let _guard = self.lock();
        self.put_json(keys::LEADERBOARD, &entries)
    }

    pub fn update_leaderboard(
        &self,
        f: impl FnOnce(Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry>,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        self.update(keys::LEADERBOARD, f)
    }

    /// Cached fixtures. Never authoritative.
    pub fn load_matches(&self) -> Vec<Match> {
        self.load_json(keys::MATCHES)
    }

    pub fn save_matches(&self, matches: &[Match]) -> StoreResult<()> {
        let _guard = self.lock();
        self.put_json(keys::MATCHES, &matches)
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    pub fn load_profile_name(&self) -> String {
        self.load_raw(keys::PROFILE_NAME).unwrap_or_default()
    }

    pub fn save_profile_name(&self, name: &str) -> StoreResult<()> {
        let _guard = self.lock();
        self.storage.set(keys::PROFILE_NAME, name)
    }

    pub fn load_user_id(&self) -> Option<String> {
        self.load_raw(keys::USER_ID).filter(|id| !id.trim().is_empty())
    }

    pub fn save_user_id(&self, user_id: &str) -> StoreResult<()> {
        let _guard = self.lock();
        self.storage.set(keys::USER_ID, user_id)
    }

    pub fn load_language(&self) -> Language {
        self.load_raw(keys::LANGUAGE)
            .and_then(|code| Language::from_code(code.trim()))
            .unwrap_or_default()
    }

    pub fn save_language(&self, language: Language) -> StoreResult<()> {
        let _guard = self.lock();
        self.storage.set(keys::LANGUAGE, language.code())
    }

    /// Wipe everything the player produced on this device. Not reversible.
    pub fn clear_app_data(&self) -> StoreResult<()> {
        let _guard = self.lock();
        for key in APP_DATA_KEYS {
            self.storage.remove(key)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<T, F>(&self, key: &str, f: F) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(T) -> T,
    {
        let _guard = self.lock();
        let updated = f(self.load_json(key));
        self.put_json(key, &updated)?;
        Ok(updated)
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("reading {key} failed, using default: {e}");
                None
            }
        }
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.load_raw(key) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("stored {key} is corrupt, using default: {e}");
            T::default()
        })
    }

    fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let payload = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.storage.set(key, &payload)
    }
}
