use super::{LeaderboardRow, LeagueRow, MembershipRow, PredictionRow, ProfileRow, RemoteBackend, RoundRow};
use crate::auth::IdentityProvider;
use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=minimal";

/// Supabase tables over PostgREST (`<url>/rest/v1/<table>`).
pub struct SupabaseRest {
    client: Client,
    base_url: String,
    api_key: String,
    identity: Arc<dyn IdentityProvider>,
}

impl SupabaseRest {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            client: Client::builder()
                .user_agent("best6/0.1 (sync)")
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            identity,
        }
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> RemoteResult<Url> {
        let mut url = Url::parse(&format!("{}/rest/v1/{table}", self.base_url))
            .map_err(|e| RemoteError::Other(format!("bad backend url: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.identity.access_token().unwrap_or_else(|| self.api_key.clone());
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> RemoteResult<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e, url.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| RemoteError::Status(e, url.to_string()))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, params: &[(&str, String)]) -> RemoteResult<Vec<T>> {
        let url = self.table_url(table, params)?;
        debug!("GET {url}");
        let response = self.send(self.client.get(url.clone()), &url).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| RemoteError::Decode(e, url.to_string()))
    }

    async fn upsert<T: Serialize + ?Sized>(&self, table: &str, on_conflict: &str, rows: &T) -> RemoteResult<()> {
        let url = self.table_url(table, &[("on_conflict", on_conflict.to_owned())])?;
        debug!("UPSERT {url}");
        let request = self
            .client
            .post(url.clone())
            .header("Prefer", MERGE_DUPLICATES)
            .json(rows);
        self.send(request, &url).await.map(|_| ())
    }

    async fn delete(&self, table: &str, params: &[(&str, String)]) -> RemoteResult<()> {
        let url = self.table_url(table, params)?;
        debug!("DELETE {url}");
        self.send(self.client.delete(url.clone()), &url).await.map(|_| ())
    }

    /// Delete the user's rows whose `column` is not in `keep`.
    async fn delete_absent(&self, table: &str, user_id: &str, column: &str, keep: Vec<String>) -> RemoteResult<()> {
        let mut params = vec![("user_id", eq(user_id))];
        if !keep.is_empty() {
            params.push((column, format!("not.in.({})", keep.join(","))));
        }
        self.delete(table, &params).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Quote a value for a PostgREST `in.(...)` list.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl RemoteBackend for SupabaseRest {
    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<Option<ProfileRow>> {
        let rows: Vec<ProfileRow> = self
            .select("profiles", &[("select", "*".into()), ("id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, row: &ProfileRow) -> RemoteResult<()> {
        self.upsert("profiles", "id", std::slice::from_ref(row)).await
    }

    async fn fetch_predictions(&self, user_id: &str) -> RemoteResult<Vec<PredictionRow>> {
        self.select("predictions", &[("select", "*".into()), ("user_id", eq(user_id))])
            .await
    }

    async fn replace_predictions(&self, user_id: &str, rows: &[PredictionRow]) -> RemoteResult<()> {
        if !rows.is_empty() {
            self.upsert("predictions", "user_id,match_id", rows).await?;
        }
        let keep = rows.iter().map(|r| r.match_id.to_string()).collect();
        self.delete_absent("predictions", user_id, "match_id", keep).await
    }

    async fn fetch_rounds(&self, user_id: &str) -> RemoteResult<Vec<RoundRow>> {
        self.select("rounds", &[("select", "*".into()), ("user_id", eq(user_id))])
            .await
    }

    async fn replace_rounds(&self, user_id: &str, rows: &[RoundRow]) -> RemoteResult<()> {
        if !rows.is_empty() {
            self.upsert("rounds", "id", rows).await?;
        }
        let keep = rows.iter().map(|r| quoted(&r.id)).collect();
        self.delete_absent("rounds", user_id, "id", keep).await
    }

    async fn fetch_memberships(&self, user_id: &str) -> RemoteResult<Vec<MembershipRow>> {
        self.select(
            "league_members",
            &[("select", "league_id,leagues(name,code)".into()), ("user_id", eq(user_id))],
        )
        .await
    }

    async fn find_league_id(&self, code: &str) -> RemoteResult<Option<String>> {
        let rows: Vec<LeagueRow> = self
            .select("leagues", &[("select", "id".into()), ("code", eq(code))])
            .await?;
        Ok(rows.into_iter().next().map(|l| l.id))
    }

    async fn create_league(&self, name: &str, code: &str) -> RemoteResult<String> {
        let url = self.table_url("leagues", &[("select", "id".into())])?;
        let request = self
            .client
            .post(url.clone())
            .header("Prefer", "return=representation")
            .json(&json!([{ "name": name, "code": code }]));
        let rows: Vec<LeagueRow> = self
            .send(request, &url)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e, url.to_string()))?;
        rows.into_iter()
            .next()
            .map(|l| l.id)
            .ok_or_else(|| RemoteError::Other(format!("league {code} was not created")))
    }

    async fn replace_memberships(&self, user_id: &str, league_ids: &[String]) -> RemoteResult<()> {
        if !league_ids.is_empty() {
            let rows: Vec<serde_json::Value> = league_ids
                .iter()
                .map(|id| json!({ "league_id": id, "user_id": user_id }))
                .collect();
            self.upsert("league_members", "league_id,user_id", &rows).await?;
        }
        let keep = league_ids.iter().map(|id| quoted(id)).collect();
        self.delete_absent("league_members", user_id, "league_id", keep).await
    }

    async fn fetch_leaderboard(&self, user_id: &str) -> RemoteResult<Option<LeaderboardRow>> {
        let rows: Vec<LeaderboardRow> = self
            .select("leaderboard", &[("select", "*".into()), ("user_id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_leaderboard(&self, row: &LeaderboardRow) -> RemoteResult<()> {
        self.upsert("leaderboard", "user_id", std::slice::from_ref(row)).await
    }
}
