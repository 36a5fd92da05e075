//! Error types for Slack operations.
//!
//! Every failure propagates to the caller. Nothing here is retried: an
//! authority rejection, an API rejection, a store failure and a local
//! validation failure each map to their own variant so the invoking flow
//! can report it and stop.

use std::fmt;

use secrecy::SecretString;
use slackctl_env_store::EnvStoreError;
use thiserror::Error;

/// The Web API operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    /// `chat.postMessage`
    PostMessage,
    /// `chat.postMessage` with `thread_ts`
    ReplyToMessage,
    /// `chat.update`
    UpdateMessage,
    /// `chat.delete`
    DeleteMessage,
    /// `chat.scheduleMessage`
    ScheduleMessage,
    /// `apps.manifest.create`
    BuildApp,
    /// `apps.manifest.update`
    UpdateApp,
    /// `apps.manifest.validate`
    ValidateManifest,
}

impl ApiOperation {
    /// Web API method name.
    pub fn method(&self) -> &'static str {
        match self {
            ApiOperation::PostMessage | ApiOperation::ReplyToMessage => "chat.postMessage",
            ApiOperation::UpdateMessage => "chat.update",
            ApiOperation::DeleteMessage => "chat.delete",
            ApiOperation::ScheduleMessage => "chat.scheduleMessage",
            ApiOperation::BuildApp => "apps.manifest.create",
            ApiOperation::UpdateApp => "apps.manifest.update",
            ApiOperation::ValidateManifest => "apps.manifest.validate",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ApiOperation::PostMessage | ApiOperation::ReplyToMessage => "Message failed to send",
            ApiOperation::UpdateMessage => "Message failed to update",
            ApiOperation::DeleteMessage => "Message failed to delete",
            ApiOperation::ScheduleMessage => "Message failed to schedule",
            ApiOperation::BuildApp => "Slack app creation failed",
            ApiOperation::UpdateApp => "Slack app update failed",
            ApiOperation::ValidateManifest => "Manifest validation failed",
        };
        f.write_str(text)
    }
}

/// Errors that can occur during Slack operations.
#[derive(Error, Debug)]
pub enum SlackError {
    /// The rotation authority rejected the refresh token.
    #[error("Failed to refresh config access token: {code}")]
    Authorization {
        /// Error code from Slack (e.g., "invalid_refresh_token").
        code: String,
    },

    /// A message or app operation was rejected by the Web API.
    #[error("{operation}: {code}")]
    Api {
        /// Operation that failed.
        operation: ApiOperation,
        /// Error code from Slack (e.g., "channel_not_found").
        code: String,
        /// Per-field problems reported alongside the code, if any.
        details: Vec<String>,
    },

    /// API rate limited. Not retried.
    #[error("{operation}: rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        operation: ApiOperation,
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The env file could not be read or written.
    #[error("Credential storage error: {0}")]
    Store(#[from] EnvStoreError),

    /// The refresh token was rotated but the new one could not be saved.
    ///
    /// The previous refresh token is already invalid at this point, so the
    /// new one is carried here for the operator to save by hand.
    #[error("Refresh token was rotated but could not be saved to {key}: {source}")]
    RotationNotPersisted {
        /// Store key the token should have been written to.
        key: String,
        /// The new, unsaved refresh token.
        refresh_token: SecretString,
        #[source]
        source: EnvStoreError,
    },

    /// A required input is missing or malformed. No request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error (missing or invalid config).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// A successful response was missing a required field.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SlackError::Json(err.to_string())
        } else if err.is_connect() {
            SlackError::Network(format!("Connection failed: {}", err))
        } else {
            SlackError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(err: serde_json::Error) -> Self {
        SlackError::Json(err.to_string())
    }
}

/// Result type for Slack operations.
pub type SlackResult<T> = std::result::Result<T, SlackError>;

impl SlackError {
    /// Slack error code, for authority and API rejections.
    pub fn code(&self) -> Option<&str> {
        match self {
            SlackError::Authorization { code } | SlackError::Api { code, .. } => {
                Some(code.as_str())
            }
            SlackError::RateLimited { .. } => Some("ratelimited"),
            _ => None,
        }
    }
}
