//! CLI styling and formatting.
//!
//! Defines ANSI colors and formatting for the CLI help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme with cyan headers and green literals.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section documenting the env file and quick start.
pub const AFTER_HELP: &str = color_print::cstr!(
    r#"<cyan,bold>QUICK START</>
    <green,bold>slackctl init</> <dim>--refresh-token xoxe-1-...</>   Create .env with your refresh token
    <green,bold>slackctl app build --save-app-id</>          Build the app from manifest.yml
    <green,bold>slackctl message post</> <dim>"Hello World!"</>        Post to SLACK_CHANNEL_ID
    <green,bold>slackctl message delete</> <dim>-t 1712345678.000100</>

<cyan,bold>ENV FILE KEYS</>
    <yellow>SLACK_CONFIG_REFRESH_TOKEN</>   App configuration refresh token, rotated on every app command
    <yellow>SLACK_APP_ID</>                 App to update
    <yellow>SLACK_CHANNEL_ID</>             Channel messages are posted to
    <yellow>SLACK_BOT_ACCESS_TOKEN</>       Bot user OAuth token (xoxb-...)
    Values already set in the environment take precedence over the file.

<cyan,bold>ENVIRONMENT VARIABLES</>
    <yellow>SLACKCTL_LOG_LEVEL</>   Log verbosity (error, warn, info, debug, trace)
    <yellow>NO_COLOR</>             Disable colored output

<cyan,bold>LEARN MORE</>
    <blue,underline>https://api.slack.com/apps</>                       Configuration tokens and apps
    <blue,underline>https://api.slack.com/reference/manifests</>        Writing a manifest"#
);
