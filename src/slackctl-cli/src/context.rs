//! Shared state for command handlers.

use std::path::{Path, PathBuf};

use anyhow::Result;
use secrecy::ExposeSecret;
use slackctl_env_store::{EnvFile, EnvStoreError};
use slackctl_slack::{
    ApiOptions, ConfigTokenSession, SlackApiClient, SlackCtlConfig, SlackError, TokenRotator,
};

use tracing::debug;

use crate::cli::Cli;
use crate::styled_output::{print_error, print_warning};

/// Env file location and HTTP options resolved from the global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
    env_file: PathBuf,
    options: ApiOptions,
}

impl CommandContext {
    pub fn new(env_file: impl Into<PathBuf>, options: ApiOptions) -> Self {
        Self {
            env_file: env_file.into(),
            options,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(cli.env_file.clone(), cli.api_options())
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    /// Load the env file, overlaid with the process environment.
    pub fn load_config(&self) -> Result<SlackCtlConfig> {
        let config = SlackCtlConfig::from_env_file(&self.env_file)?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Client authorised with the bot token, plus the channel to post to.
    pub fn bot_client(&self, config: &SlackCtlConfig) -> Result<(SlackApiClient, String)> {
        let channel = config.require_channel_id()?.to_string();
        let token = config.require_bot_access_token()?.clone();
        let client = SlackApiClient::new(token, self.options.clone())?;
        Ok((client, channel))
    }

    /// Rotate the configuration token, save the new refresh token, and
    /// return a client authorised with the fresh access token.
    pub async fn config_client(&self, config: &SlackCtlConfig) -> Result<SlackApiClient> {
        let refresh_token = config.require_config_refresh_token()?;
        debug!("Rotating config token before app call");
        let rotator = TokenRotator::new(self.options.clone())?;
        let mut session = ConfigTokenSession::new(rotator, EnvFile::new(&self.env_file));

        let access_token = session.access_token(refresh_token).await.map_err(|err| {
            report_unsaved_rotation(&err);
            let missing_file = matches!(err, SlackError::Store(EnvStoreError::NotFound { .. }));
            let err = anyhow::Error::from(err);
            if missing_file {
                err.context(format!(
                    "Rotated refresh tokens are saved to {}; run `slackctl init` to create it",
                    self.env_file.display()
                ))
            } else {
                err
            }
        })?;

        Ok(SlackApiClient::new(access_token, self.options.clone())?)
    }
}

/// Print the new refresh token when it could not be saved, so the operator
/// can store it by hand. The previous one has already been consumed.
pub fn report_unsaved_rotation(err: &SlackError) {
    if let SlackError::RotationNotPersisted {
        key, refresh_token, ..
    } = err
    {
        print_error(&format!(
            "The config token was rotated but the new refresh token could not be saved to {}",
            key
        ));
        eprintln!("{}={}", key, refresh_token.expose_secret());
        print_warning(
            "Add the line above to your env file by hand. The previous refresh token no longer works.",
        );
    }
}
