use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CODE_PREFIX: &str = "B6-";

/// Member count shown for a league joined by code, before the backend reports one.
const JOINED_LEAGUE_MEMBERS: u32 = 12;

/// A private league. Leagues are identified by `code` when merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub name: String,
    pub code: String,
    pub members: u32,
}

impl League {
    /// A new league owned by the local player. A blank code gets a random
    /// `B6-nnn` one.
    pub fn create<R: Rng + ?Sized>(
        name: &str,
        code: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::LeagueNameRequired);
        }
        let code = match code.trim() {
            "" => generate_code(rng),
            given => given.to_owned(),
        };
        Ok(Self { id: local_id(now), name: name.to_owned(), code, members: 1 })
    }

    /// Join an existing league by its invite code.
    pub fn join(code: &str, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::LeagueCodeRequired);
        }
        Ok(Self {
            id: local_id(now),
            name: format!("League {code}"),
            code: code.to_owned(),
            members: JOINED_LEAGUE_MEMBERS,
        })
    }
}

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{CODE_PREFIX}{}", rng.random_range(100..1000))
}

fn local_id(now: DateTime<Utc>) -> String {
    format!("league-{}", now.timestamp_millis())
}
