//! Who is playing. The strategy is picked at startup: a bypass provider for
//! local/test play, or Supabase GoTrue for real accounts.

use crate::error::AuthError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The authenticated remote user id, if there is one.
    async fn current_user_id(&self) -> Option<String>;

    /// Bearer token for backend requests made on the user's behalf.
    fn access_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool;

    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Treats every sign-in as successful and never reports a remote identity, so
/// sync runs under the device's generated id.
#[derive(Debug)]
pub struct BypassAuth {
    authenticated: AtomicBool,
}

impl Default for BypassAuth {
    fn default() -> Self {
        Self { authenticated: AtomicBool::new(true) }
    }
}

impl BypassAuth {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for BypassAuth {
    async fn current_user_id(&self) -> Option<String> {
        None
    }

    fn access_token(&self) -> Option<String> {
        None
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        self.authenticated.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<(), AuthError> {
        self.authenticated.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.authenticated.store(false, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
}

/// Email/password accounts against Supabase GoTrue (`<url>/auth/v1`).
#[derive(Debug)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            session: RwLock::new(None),
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(|p| p.into_inner()) = session;
    }

    async fn request_session(&self, path: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorResponse = response.json().await.unwrap_or_default();
            let reason = body
                .error_description
                .or(body.msg)
                .unwrap_or_else(|| status.to_string());
            return Err(AuthError::Rejected(reason));
        }

        let token: TokenResponse = response.json().await?;
        // Sign-up without email confirmation returns no session yet.
        if let (Some(access_token), Some(user)) = (token.access_token, token.user) {
            debug!("signed in as {}", user.id);
            self.set_session(Some(Session { access_token, user_id: user.id }));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn current_user_id(&self) -> Option<String> {
        let session = self.session()?;
        let url = format!("{}/auth/v1/user", self.base_url);
        let result = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(response) => match response.json::<UserResponse>().await {
                Ok(user) => Some(user.id),
                Err(e) => {
                    warn!("unreadable auth user response: {e}");
                    None
                }
            },
            Err(e) => {
                warn!("auth user lookup failed: {e}");
                None
            }
        }
    }

    fn access_token(&self) -> Option<String> {
        self.session().map(|s| s.access_token)
    }

    fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.request_session("token?grant_type=password", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.request_session("signup", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        self.set_session(None);
        let url = format!("{}/auth/v1/logout", self.base_url);
        self.client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn bypass_never_reports_a_remote_identity() {
        let auth = BypassAuth::new();
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user_id().await, None);
        auth.sign_out().await.unwrap();
        assert!(!auth.is_authenticated());
        auth.sign_in("a@b.c", "pw").await.unwrap();
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn supabase_sign_in_then_lookup() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .match_header("apikey", "anon")
            .match_body(Matcher::PartialJson(json!({ "email": "sam@example.com" })))
            .with_status(200)
            .with_body(r#"{"access_token":"jwt-1","user":{"id":"user-42"}}"#)
            .create_async()
            .await;
        let _user = server
            .mock("GET", "/auth/v1/user")
            .match_header("authorization", "Bearer jwt-1")
            .with_status(200)
            .with_body(r#"{"id":"user-42"}"#)
            .create_async()
            .await;

        let auth = SupabaseAuth::new(server.url(), "anon");
        assert_eq!(auth.current_user_id().await, None);

        auth.sign_in("sam@example.com", "pw").await.unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.access_token().as_deref(), Some("jwt-1"));
        assert_eq!(auth.current_user_id().await.as_deref(), Some("user-42"));
    }

    #[tokio::test]
    async fn supabase_rejection_carries_the_reason() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
            .create_async()
            .await;

        let auth = SupabaseAuth::new(server.url(), "anon");
        let err = auth.sign_in("sam@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(ref reason) if reason == "Invalid login credentials"));
        assert!(!auth.is_authenticated());
    }
}
