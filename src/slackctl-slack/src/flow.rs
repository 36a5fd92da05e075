//! Rotate-then-persist.
//!
//! Refresh tokens are single use. The new refresh token must be on disk
//! before the access token that came with it is used, or the next run has
//! nothing valid to rotate with.

use secrecy::{ExposeSecret, SecretString};
use slackctl_env_store::CredentialStore;
use tracing::{error, info};

use crate::config::KEY_CONFIG_REFRESH_TOKEN;
use crate::error::{SlackError, SlackResult};
use crate::rotation::TokenRotator;

/// Rotate `current` and save the new refresh token under `key`.
///
/// The store is read once before rotating so that an unreadable or missing
/// store fails without consuming the refresh token. If the write after a
/// successful rotation fails, [`SlackError::RotationNotPersisted`] carries
/// the new refresh token back to the caller.
///
/// Returns the access token for the rest of this invocation.
pub async fn rotate_and_persist<S>(
    rotator: &TokenRotator,
    store: &mut S,
    key: &str,
    current: &SecretString,
) -> SlackResult<SecretString>
where
    S: CredentialStore + ?Sized,
{
    store.get_value(key)?;

    let (access_token, refresh_token) = rotator.rotate(current).await?.into_parts();

    if let Err(source) = store.set_value(key, refresh_token.expose_secret()) {
        error!("Rotated refresh token could not be saved to {}", key);
        return Err(SlackError::RotationNotPersisted {
            key: key.to_string(),
            refresh_token,
            source,
        });
    }

    info!("Rotated config token and saved new refresh token to {}", key);
    Ok(access_token)
}

/// A rotator bound to the store and key its refresh token lives under.
#[derive(Debug)]
pub struct ConfigTokenSession<S> {
    rotator: TokenRotator,
    store: S,
    key: String,
}

impl<S: CredentialStore> ConfigTokenSession<S> {
    /// Session persisting under `SLACK_CONFIG_REFRESH_TOKEN`.
    pub fn new(rotator: TokenRotator, store: S) -> Self {
        Self {
            rotator,
            store,
            key: KEY_CONFIG_REFRESH_TOKEN.to_string(),
        }
    }

    /// Persist under a different key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Key the refresh token is saved under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Rotate `current` and return a fresh access token.
    pub async fn access_token(&mut self, current: &SecretString) -> SlackResult<SecretString> {
        rotate_and_persist(&self.rotator, &mut self.store, &self.key, current).await
    }
}
