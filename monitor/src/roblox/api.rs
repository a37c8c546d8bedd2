use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use presence_tracker::config::EndpointConfig;
use presence_tracker::{PresenceCode, PresenceSnapshot, PresenceTuple};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::{auth_cookie, REQUEST_TIMEOUT_SECS, USER_AGENT};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsernamesRequest<'a> {
    usernames: [&'a str; 1],
    exclude_banned_users: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresenceRequest {
    user_ids: [u64; 1],
}

/// Account returned by username lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobloxUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    data: Vec<RobloxUser>,
}

/// Presence entry for one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    #[serde(default)]
    pub user_presence_type: Option<i64>,
    #[serde(default)]
    pub place_id: Option<u64>,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub universe_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl UserPresence {
    /// Normalise into a snapshot. Missing or unknown presence types read as offline.
    pub fn into_snapshot(self) -> PresenceSnapshot {
        let code = PresenceCode::from_api(self.user_presence_type.unwrap_or(0));
        let tuple = PresenceTuple::new(
            code,
            self.place_id.map(|id| id.to_string()),
            self.game_id,
        );
        PresenceSnapshot::new(tuple, Utc::now())
            .with_universe_id(self.universe_id.map(|id| id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresenceResponse {
    user_presences: Vec<UserPresence>,
}

/// Experience summary from the games API.
#[derive(Debug, Deserialize)]
pub struct RobloxGame {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    data: Vec<RobloxGame>,
}

/// HTTP client for the Roblox users, presence and games APIs.
///
/// Sends the `.ROBLOSECURITY` cookie on users/presence requests when a
/// credential is configured. The games API is called anonymously.
pub struct RobloxClient {
    http_client: Client,
    endpoints: EndpointConfig,
    roblosecurity: Option<String>,
}

impl RobloxClient {
    pub fn new(endpoints: EndpointConfig, roblosecurity: Option<String>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            endpoints,
            roblosecurity,
        })
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.roblosecurity {
            Some(cookie) => request.header(reqwest::header::COOKIE, auth_cookie(cookie)),
            None => request,
        }
    }

    /// Look up an account by username. Banned accounts are included.
    pub async fn fetch_user(&self, username: &str) -> Result<Option<RobloxUser>> {
        let url = format!("{}/v1/usernames/users", self.endpoints.users_url);
        let body = UsernamesRequest {
            usernames: [username],
            exclude_banned_users: false,
        };
        let response = self
            .authenticated(self.http_client.post(&url))
            .json(&body)
            .send()
            .await
            .context("Failed to send username lookup request")?;

        check_response_status(&response)?;
        let users: UsersResponse = response
            .json()
            .await
            .context("Failed to parse username lookup response")?;
        Ok(users.data.into_iter().next())
    }

    /// Fetch the presence entry for one account.
    pub async fn fetch_presence(&self, user_id: u64) -> Result<UserPresence> {
        let url = format!("{}/v1/presence/users", self.endpoints.presence_url);
        let body = PresenceRequest { user_ids: [user_id] };
        let response = self
            .authenticated(self.http_client.post(&url))
            .json(&body)
            .send()
            .await
            .context("Failed to send presence request")?;

        check_response_status(&response)?;
        let presences: PresenceResponse = response
            .json()
            .await
            .context("Failed to parse presence response")?;

        let mut entries = presences.user_presences;
        let index = entries
            .iter()
            .position(|p| p.user_id == Some(user_id))
            .unwrap_or(0);
        if entries.is_empty() {
            return Err(anyhow!("Presence response contained no entry for user {}", user_id));
        }
        Ok(entries.swap_remove(index))
    }

    /// Fetch the name of an experience by universe id.
    pub async fn fetch_game_name(&self, universe_id: &str) -> Result<Option<String>> {
        let url = format!("{}/v1/games", self.endpoints.games_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("universeIds", universe_id)])
            .send()
            .await
            .context("Failed to send games request")?;

        check_response_status(&response)?;
        let games: GamesResponse = response
            .json()
            .await
            .context("Failed to parse games response")?;
        Ok(games.data.into_iter().next().map(|g| g.name))
    }
}

/// Check the response status and map known error codes to descriptive errors.
///
/// - 401 → auth error (cookie expired or invalid)
/// - 429 → rate limited (logs Retry-After when present)
/// - Other non-2xx → generic API error
fn check_response_status(response: &reqwest::Response) -> Result<()> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(anyhow!("Roblox auth error: cookie expired or invalid")),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            Err(anyhow!(
                "Roblox rate limit exceeded (Retry-After: {})",
                retry_after
            ))
        }
        s if !s.is_success() => Err(anyhow!("Roblox API error: {}", s)),
        _ => Ok(()),
    }
}
