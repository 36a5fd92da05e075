//! App configuration token rotation.
//!
//! Slack configuration tokens are short lived. Each rotation exchanges a
//! refresh token for a new access token *and* a new refresh token; the old
//! refresh token stops working as soon as the exchange succeeds.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiOptions;
use crate::error::{SlackError, SlackResult};

const ROTATE_METHOD: &str = "tooling.tokens.rotate";

/// A rotated access token together with its replacement refresh token.
#[derive(Clone)]
pub struct CredentialPair {
    /// Short-lived configuration access token (xoxe.xoxp-...).
    pub access_token: SecretString,
    /// Refresh token to use for the next rotation (xoxe-...).
    pub refresh_token: SecretString,
    /// Unix time the access token expires, when reported.
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CredentialPair {
    /// Split into `(access_token, refresh_token)`.
    pub fn into_parts(self) -> (SecretString, SecretString) {
        (self.access_token, self.refresh_token)
    }
}

#[derive(Debug, Deserialize)]
struct RotateResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Exchanges refresh tokens with `tooling.tokens.rotate`.
#[derive(Debug, Clone)]
pub struct TokenRotator {
    client: reqwest::Client,
    options: ApiOptions,
}

impl TokenRotator {
    /// Create a rotator.
    pub fn new(options: ApiOptions) -> SlackResult<Self> {
        let client = options.build_client()?;
        Ok(Self { client, options })
    }

    /// Exchange `refresh_token` for a new credential pair.
    ///
    /// Makes exactly one request. An `ok: false` answer becomes
    /// [`SlackError::Authorization`]; transport failures are
    /// [`SlackError::Network`]. The caller must persist the returned
    /// refresh token before using the access token.
    pub async fn rotate(&self, refresh_token: &SecretString) -> SlackResult<CredentialPair> {
        if refresh_token.expose_secret().trim().is_empty() {
            return Err(SlackError::Validation(
                "Refresh token is empty".to_string(),
            ));
        }

        let url = self.options.method_url(ROTATE_METHOD);
        debug!("Rotating config token via {}", ROTATE_METHOD);

        let response = self
            .client
            .get(&url)
            .query(&[("refresh_token", refresh_token.expose_secret())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("{} returned HTTP {}", ROTATE_METHOD, status);
            return Err(SlackError::Network(format!(
                "{} returned HTTP {}",
                ROTATE_METHOD, status
            )));
        }

        let body: RotateResponse = response.json().await?;
        if !body.ok {
            let code = body.error.unwrap_or_else(|| "unknown".to_string());
            warn!("Config token rotation rejected: {}", code);
            return Err(SlackError::Authorization { code });
        }

        let access_token = body.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            SlackError::InvalidPayload("Missing token in rotation response".to_string())
        })?;
        let new_refresh_token = body
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SlackError::InvalidPayload(
                    "Missing refresh_token in rotation response".to_string(),
                )
            })?;

        Ok(CredentialPair {
            access_token: SecretString::new(access_token.into()),
            refresh_token: SecretString::new(new_refresh_token.into()),
            expires_at: body.exp,
        })
    }
}
