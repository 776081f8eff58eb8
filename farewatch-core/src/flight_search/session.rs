//! Client-credentials session for the Amadeus API.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{FarewatchError, FarewatchResult};

const SERVICE: &str = "token endpoint";

/// API key and secret issued by Amadeus for the client-credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

pub struct Session {
    token_url: String,
    credentials: Credentials,
    data: SessionData,
}

struct SessionData {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl Session {
    /// Exchange the credentials for a bearer token.
    pub async fn acquire(
        http: &reqwest::Client,
        token_url: impl Into<String>,
        credentials: Credentials,
    ) -> FarewatchResult<Self> {
        let token_url = token_url.into();
        let data = request_token(http, &token_url, &credentials).await?;

        Ok(Session {
            token_url,
            credentials,
            data,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.data.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    pub async fn refresh_if_needed(&mut self, http: &reqwest::Client) -> FarewatchResult<()> {
        if self.is_expired() {
            debug!("Access token expired, requesting a new one");
            self.data = request_token(http, &self.token_url, &self.credentials).await?;
        }

        Ok(())
    }
}

async fn request_token(
    http: &reqwest::Client,
    token_url: &str,
    credentials: &Credentials,
) -> FarewatchResult<SessionData> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.key.as_str()),
        ("client_secret", credentials.secret.as_str()),
    ];

    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|source| FarewatchError::Transport {
            service: SERVICE,
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FarewatchError::Status {
            service: SERVICE,
            status: status.as_u16(),
            body,
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| FarewatchError::Auth(format!("unexpected token response: {e}")))?;

    if token.access_token.is_empty() {
        return Err(FarewatchError::Auth("token response has an empty access_token".into()));
    }

    let expires_at = expiry_after(Utc::now(), token.expires_in)?;
    info!(expires_in = token.expires_in, "Acquired access token");

    Ok(SessionData {
        access_token: token.access_token,
        expires_at,
    })
}

/// Absolute expiry for a token issued at `now`. A negative lifetime counts as
/// already expired.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> FarewatchResult<DateTime<Utc>> {
    Duration::try_seconds(expires_in.max(0))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| FarewatchError::Auth(format!("expires_in out of range: {expires_in}")))
}
