use chrono::NaiveDate;
use football_data_api::client::{DEFAULT_COMPETITION, Endpoint, FOOTBALL_DATA_V4};
use log::{LevelFilter, warn};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MATCHDAY: u32 = 19;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Every sign-in succeeds and sync runs under the device id.
    #[default]
    Bypass,
    Supabase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub data_dir: PathBuf,
    pub supabase: Option<SupabaseSettings>,
    pub auth: AuthStrategy,
    /// `None` plays the built-in sample slate.
    pub fixtures: Option<Endpoint>,
    pub competition: String,
    pub matchday: u32,
    /// Keep only fixtures kicking off on this day when building the slate.
    pub slate_date: Option<NaiveDate>,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".best6"),
            supabase: None,
            auth: AuthStrategy::Bypass,
            fixtures: None,
            competition: DEFAULT_COMPETITION.to_owned(),
            matchday: DEFAULT_MATCHDAY,
            slate_date: None,
            log_level: None,
        }
    }
}

impl AppSettings {
    /// Read `BEST6_*` environment variables. Unset or unparsable values fall back
    /// to defaults.
    pub fn load() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let supabase = match (get("BEST6_SUPABASE_URL"), get("BEST6_SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseSettings { url, anon_key }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("BEST6_SUPABASE_URL and BEST6_SUPABASE_ANON_KEY must be set together");
                None
            }
            (None, None) => None,
        };

        let auth = match get("BEST6_AUTH").as_deref() {
            None | Some("bypass") => AuthStrategy::Bypass,
            Some("supabase") if supabase.is_some() => AuthStrategy::Supabase,
            Some("supabase") => {
                warn!("BEST6_AUTH=supabase needs a Supabase URL and key, using bypass");
                AuthStrategy::Bypass
            }
            Some(other) => {
                warn!("unknown BEST6_AUTH {other:?}, using bypass");
                AuthStrategy::Bypass
            }
        };

        let fixtures = match (get("BEST6_FOOTBALL_PROXY_URL"), get("BEST6_FOOTBALL_API_KEY")) {
            (Some(url), _) => Some(Endpoint::Proxy { url }),
            (None, Some(api_key)) => Some(Endpoint::Direct {
                base_url: get("BEST6_FOOTBALL_API_URL").unwrap_or_else(|| FOOTBALL_DATA_V4.to_owned()),
                api_key,
            }),
            (None, None) => None,
        };

        Self {
            data_dir: get("BEST6_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| default_data_dir(&get)),
            supabase,
            auth,
            fixtures,
            competition: get("BEST6_COMPETITION").unwrap_or(defaults.competition),
            matchday: parsed(&get, "BEST6_MATCHDAY").unwrap_or(defaults.matchday),
            slate_date: parsed(&get, "BEST6_SLATE_DATE"),
            log_level: parsed(&get, "BEST6_LOG"),
        }
    }
}

fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}

fn default_data_dir(get: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(data_home) = get("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join("best6");
    }
    if let Some(home) = get("HOME") {
        return PathBuf::from(home).join(".local").join("share").join("best6");
    }
    PathBuf::from(".best6")
}
