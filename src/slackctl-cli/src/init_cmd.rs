//! Init command.
//!
//! Creates the env file if it does not exist and saves whichever values
//! were passed. Prints the remaining setup steps for the values still
//! missing.

use anyhow::Result;
use clap::Parser;
use slackctl_env_store::{CredentialStore, EnvFile};
use slackctl_slack::config::{
    KEY_APP_ID, KEY_BOT_ACCESS_TOKEN, KEY_CHANNEL_ID, KEY_CONFIG_REFRESH_TOKEN,
};
use slackctl_slack::manifest::DEFAULT_MANIFEST_FILE;
use slackctl_slack::{SlackCtlConfig, app_install_url};

use crate::context::CommandContext;
use crate::styled_output::{print_dim, print_info, print_success};

/// Init CLI command.
#[derive(Debug, Parser)]
pub struct InitCli {
    /// App configuration refresh token (xoxe-1-...)
    #[arg(long = "refresh-token", value_name = "TOKEN")]
    pub refresh_token: Option<String>,

    /// Channel ID the bot posts to
    #[arg(long = "channel-id", value_name = "ID")]
    pub channel_id: Option<String>,

    /// Bot user OAuth token (xoxb-...)
    #[arg(long = "bot-token", value_name = "TOKEN")]
    pub bot_token: Option<String>,

    /// ID of an existing app
    #[arg(long = "app-id", value_name = "ID")]
    pub app_id: Option<String>,
}

impl InitCli {
    /// Values to save, in env-file order.
    fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            (KEY_CONFIG_REFRESH_TOKEN, self.refresh_token.as_deref()),
            (KEY_APP_ID, self.app_id.as_deref()),
            (KEY_CHANNEL_ID, self.channel_id.as_deref()),
            (KEY_BOT_ACCESS_TOKEN, self.bot_token.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    /// Run the init command.
    pub fn run(self, ctx: &CommandContext) -> Result<()> {
        let mut env_file = EnvFile::new(ctx.env_file());

        if env_file.create_if_missing()? {
            print_success(&format!("Created {}", env_file.path().display()));
        } else {
            print_info(&format!("Using existing {}", env_file.path().display()));
        }

        for (key, value) in self.entries() {
            env_file.set_value(key, value)?;
            print_success(&format!("Saved {}", key));
        }

        let config = ctx.load_config()?;
        print_next_steps(&config);
        Ok(())
    }
}

fn print_next_steps(config: &SlackCtlConfig) {
    if config.config_refresh_token().is_none() {
        print_info("Next, add an app configuration refresh token:");
        print_dim("Open https://api.slack.com/apps and find \"Your App Configuration Tokens\"");
        print_dim("Generate a token for your workspace and copy its Refresh Token");
        print_dim("Run: slackctl init --refresh-token <TOKEN>");
        return;
    }

    let Some(app_id) = config.app_id() else {
        print_info(&format!(
            "Next, write {} (see https://api.slack.com/reference/manifests) and build the app:",
            DEFAULT_MANIFEST_FILE
        ));
        print_dim("Run: slackctl app build --save-app-id");
        return;
    };

    if config.bot_access_token().is_none() {
        print_info(&format!(
            "Next, install the app to your workspace at {}",
            app_install_url(app_id)
        ));
        print_dim("Copy the Bot User OAuth Token from the same page");
        print_dim("Run: slackctl init --bot-token <TOKEN>");
        return;
    }

    if config.channel_id().is_none() {
        print_info("Next, add the bot to a channel by mentioning it there, then save the channel ID:");
        print_dim("The ID is at the bottom of the channel's \"View channel details\" dialog");
        print_dim("Run: slackctl init --channel-id <ID>");
        return;
    }

    print_success("Setup complete. Try: slackctl message post \"Beep boop, Hello World!\"");
}
