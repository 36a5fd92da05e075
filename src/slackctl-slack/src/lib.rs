//! Slack Web API client for slackctl.
//!
//! This crate provides:
//! - Configuration token rotation (`tooling.tokens.rotate`)
//! - Rotate-then-persist, saving the new refresh token before the access
//!   token is used
//! - Message operations: post, reply, update, delete, schedule
//! - App manifest operations: build, update, validate
//! - Block Kit message formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use slackctl_env_store::EnvFile;
//! use slackctl_slack::{ApiOptions, AppManifest, ConfigTokenSession, SlackApiClient, SlackCtlConfig, TokenRotator};
//!
//! let config = SlackCtlConfig::from_env_file(".env".as_ref())?;
//! let options = ApiOptions::default();
//! let mut session = ConfigTokenSession::new(TokenRotator::new(options.clone())?, EnvFile::new(".env"));
//! let access_token = session.access_token(config.require_config_refresh_token()?).await?;
//!
//! let client = SlackApiClient::new(access_token, options)?;
//! client.validate_manifest(&AppManifest::load("manifest.yml".as_ref())?).await?;
//! ```
//!
//! # Configuration
//!
//! Recognised env keys:
//! - `SLACK_CONFIG_REFRESH_TOKEN` - App configuration refresh token (xoxe-...)
//! - `SLACK_BOT_ACCESS_TOKEN` - Bot OAuth token (xoxb-...)
//! - `SLACK_CHANNEL_ID` - Channel to post to
//! - `SLACK_APP_ID` - App to update

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod manifest;
pub mod messages;
pub mod rotation;

// Re-export main types
pub use client::{BuiltApp, ManifestIssue, MessageReceipt, ScheduledMessage, SlackApiClient};
pub use config::{ApiOptions, SlackCtlConfig};
pub use error::{ApiOperation, SlackError, SlackResult};
pub use flow::{ConfigTokenSession, rotate_and_persist};
pub use manifest::{AppManifest, app_install_url};
pub use messages::{
    SlackBlock, SlackMessageBuilder, SlackMessageContent, SlackTextObject,
    escape_special_characters, formatted_message, human_readable_timestamp,
};
pub use rotation::{CredentialPair, TokenRotator};
