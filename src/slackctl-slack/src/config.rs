//! Configuration for slackctl.
//!
//! Supports loading configuration from:
//! - An env file (`.env` by default), read with the same line grammar the
//!   credential store writes with, without touching the process environment
//! - Environment variables, which take precedence over the file
//!
//! Components never read the environment themselves; they receive the
//! values held here as explicit parameters.

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use slackctl_env_store::{EnvFile, EnvStoreError};
use tracing::{debug, warn};

use crate::error::{SlackError, SlackResult};

/// Env key holding the app configuration refresh token.
pub const KEY_CONFIG_REFRESH_TOKEN: &str = "SLACK_CONFIG_REFRESH_TOKEN";
/// Env key holding the bot user OAuth token.
pub const KEY_BOT_ACCESS_TOKEN: &str = "SLACK_BOT_ACCESS_TOKEN";
/// Env key holding the channel the bot posts to.
pub const KEY_CHANNEL_ID: &str = "SLACK_CHANNEL_ID";
/// Env key holding the app ID returned by a build.
pub const KEY_APP_ID: &str = "SLACK_APP_ID";

/// All keys slackctl recognises.
pub const RECOGNISED_KEYS: &[&str] = &[
    KEY_CONFIG_REFRESH_TOKEN,
    KEY_BOT_ACCESS_TOKEN,
    KEY_CHANNEL_ID,
    KEY_APP_ID,
];

/// Default Slack Web API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Values slackctl reads from its env file.
#[derive(Clone, Default)]
pub struct SlackCtlConfig {
    /// Refresh token for app configuration tokens (xoxe-...).
    config_refresh_token: Option<SecretString>,
    /// Bot user OAuth token (xoxb-...).
    bot_access_token: Option<SecretString>,
    /// Channel ID to post to.
    channel_id: Option<String>,
    /// App ID returned by `apps.manifest.create`.
    app_id: Option<String>,
}

impl std::fmt::Debug for SlackCtlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackCtlConfig")
            .field(
                "config_refresh_token",
                &self.config_refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "bot_access_token",
                &self.bot_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("channel_id", &self.channel_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl SlackCtlConfig {
    /// Build a configuration from key/value pairs. Unknown keys and empty
    /// values are ignored.
    pub fn from_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in values {
            config.apply(key.as_ref(), value.into());
        }
        config
    }

    /// Load configuration from an env file, then overlay the process
    /// environment.
    ///
    /// The file is parsed by [`EnvFile`], so each key resolves to the same
    /// verbatim value the store reads and writes. A missing file is not an
    /// error; its values are simply absent.
    pub fn from_env_file(path: &Path) -> SlackResult<Self> {
        let mut config = Self::default();

        match EnvFile::new(path).load() {
            Ok(document) => {
                for key in RECOGNISED_KEYS {
                    if let Some(value) = document.get(key) {
                        config.apply(key, value.to_string());
                    }
                }
                debug!("Loaded env file {}", path.display());
            }
            Err(EnvStoreError::NotFound { .. }) => {
                debug!("Env file {} not found, using environment only", path.display());
            }
            Err(e) => {
                return Err(SlackError::Config(format!(
                    "Failed to read env file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        for key in RECOGNISED_KEYS {
            if let Ok(value) = std::env::var(key) {
                config.apply(key, value);
            }
        }

        Ok(config)
    }

    fn apply(&mut self, key: &str, value: String) {
        if value.is_empty() {
            return;
        }
        match key {
            KEY_CONFIG_REFRESH_TOKEN => {
                self.config_refresh_token = Some(SecretString::new(value.into()));
            }
            KEY_BOT_ACCESS_TOKEN => {
                if !value.starts_with("xoxb-") {
                    warn!("Bot token doesn't start with 'xoxb-', this may be incorrect");
                }
                self.bot_access_token = Some(SecretString::new(value.into()));
            }
            KEY_CHANNEL_ID => self.channel_id = Some(value),
            KEY_APP_ID => self.app_id = Some(value),
            _ => {}
        }
    }

    /// Get the config refresh token, if set.
    pub fn config_refresh_token(&self) -> Option<&SecretString> {
        self.config_refresh_token.as_ref()
    }

    /// Get the bot access token, if set.
    pub fn bot_access_token(&self) -> Option<&SecretString> {
        self.bot_access_token.as_ref()
    }

    /// Get the channel ID, if set.
    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    /// Get the app ID, if set.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Get the config refresh token or fail.
    pub fn require_config_refresh_token(&self) -> SlackResult<&SecretString> {
        self.config_refresh_token.as_ref().ok_or_else(|| {
            missing(
                KEY_CONFIG_REFRESH_TOKEN,
                "Could not acquire Slack refresh token to obtain access token",
            )
        })
    }

    /// Get the bot access token or fail.
    pub fn require_bot_access_token(&self) -> SlackResult<&SecretString> {
        self.bot_access_token.as_ref().ok_or_else(|| {
            missing(
                KEY_BOT_ACCESS_TOKEN,
                "Could not acquire Slack bot user access token",
            )
        })
    }

    /// Get the channel ID or fail.
    pub fn require_channel_id(&self) -> SlackResult<&str> {
        self.channel_id()
            .ok_or_else(|| missing(KEY_CHANNEL_ID, "Could not acquire Slack channel ID"))
    }

    /// Get the app ID or fail.
    pub fn require_app_id(&self) -> SlackResult<&str> {
        self.app_id()
            .ok_or_else(|| missing(KEY_APP_ID, "Could not acquire Slack app ID"))
    }

    /// Whether all values needed to post messages are present.
    pub fn has_bot_credentials(&self) -> bool {
        self.channel_id.is_some()
            && self
                .bot_access_token
                .as_ref()
                .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

fn missing(key: &str, hint: &str) -> SlackError {
    SlackError::Config(format!("Missing env variable: {} ({})", key, hint))
}

/// HTTP options shared by the rotator and the API client.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Base URL for Web API methods, without a trailing slash.
    pub base_url: String,
    /// Overall request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ApiOptions {
    /// Options pointing at a different base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full URL for a Web API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), method)
    }

    /// Build the HTTP client for these options.
    pub fn build_client(&self) -> SlackResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| SlackError::Config(format!("Failed to create HTTP client: {}", e)))
    }
}
