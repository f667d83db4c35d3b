use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Fixtures error: {0}")]
    Fixtures(#[from] football_data_api::client::ApiError),
}

/// Rejected user input. Nothing has been mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select a first-goal minute between 1 and 120.")]
    FirstGoalMinute,

    #[error("Predictions are locked for this matchday.")]
    RoundLocked,

    #[error("Kick-off has passed for match {0}.")]
    KickoffPassed(u64),

    #[error("Unknown match {0}.")]
    UnknownMatch(u64),

    #[error("A league name is required.")]
    LeagueNameRequired,

    #[error("A league code is required.")]
    LeagueCodeRequired,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialize error for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),

    #[error("Backend rejected {1}: {0}")]
    Status(#[source] reqwest::Error, String),

    #[error("Unexpected response from {1}: {0}")]
    Decode(#[source] reqwest::Error, String),

    #[error("Remote backend is not configured")]
    NotConfigured,

    #[error("Remote error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Sign-in failed: {0}")]
    Rejected(String),

    #[error("Auth request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// True when the failure only means no backend is set up.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Error::Remote(RemoteError::NotConfigured))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
