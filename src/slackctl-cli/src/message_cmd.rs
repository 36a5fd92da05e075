//! Message command for slackctl.
//!
//! Provides message operations against `SLACK_CHANNEL_ID` using
//! `SLACK_BOT_ACCESS_TOKEN`:
//! - Post plain or formatted messages
//! - Reply in a thread
//! - Update, schedule and delete messages
//!
//! Message text comes from `--message` (`-m`), then the positional
//! argument, then the default test message.

use anyhow::{Result, bail};
use clap::Parser;
use slackctl_slack::messages::{DEFAULT_FORMATTED_HEADER, DEFAULT_MESSAGE, parse_post_at};
use slackctl_slack::{SlackMessageContent, formatted_message, human_readable_timestamp};

use crate::context::CommandContext;
use crate::styled_output::{print_dim, print_info, print_success};

/// Message CLI command.
#[derive(Debug, Parser)]
pub struct MessageCli {
    #[command(subcommand)]
    pub subcommand: MessageSubcommand,
}

/// Message subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum MessageSubcommand {
    /// Post a message
    Post(PostArgs),

    /// Post a message under a bold header and a divider
    Formatted(FormattedArgs),

    /// Reply in the thread of a message
    Reply(TimestampedArgs),

    /// Replace the text of a message
    #[command(visible_alias = "edit")]
    Update(TimestampedArgs),

    /// Schedule a message for a unix time
    Schedule(TimestampedArgs),

    /// Delete a message
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),
}

/// Message text, as a flag or a positional argument.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MessageText {
    /// Message text
    #[arg(long = "message", short = 'm', value_name = "TEXT")]
    pub message: Option<String>,

    /// Message text, used when --message is not given
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,
}

impl MessageText {
    /// The text to send.
    pub fn resolve(&self) -> &str {
        self.message
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or(DEFAULT_MESSAGE)
    }
}

/// Arguments for message post command.
#[derive(Debug, Parser)]
pub struct PostArgs {
    #[command(flatten)]
    pub text: MessageText,

    /// Emoji to show as the bot's icon, e.g. :robot_face:
    #[arg(long = "icon-emoji", value_name = "EMOJI")]
    pub icon_emoji: Option<String>,
}

/// Arguments for message formatted command.
#[derive(Debug, Parser)]
pub struct FormattedArgs {
    #[command(flatten)]
    pub text: MessageText,

    /// Header shown above the divider (mrkdwn)
    #[arg(long = "header", value_name = "TEXT", default_value = DEFAULT_FORMATTED_HEADER)]
    pub header: String,
}

/// Arguments for commands acting on a message timestamp.
#[derive(Debug, Parser)]
pub struct TimestampedArgs {
    /// Message timestamp (reply, update) or unix time to post at (schedule)
    #[arg(long = "timestamp", short = 't', value_name = "TS")]
    pub timestamp: Option<String>,

    #[command(flatten)]
    pub text: MessageText,
}

/// Arguments for message delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Timestamp of the message to delete
    #[arg(long = "timestamp", short = 't', value_name = "TS")]
    pub timestamp: Option<String>,

    /// Timestamp, used when --timestamp is not given
    #[arg(value_name = "TS")]
    pub ts: Option<String>,
}

impl DeleteArgs {
    fn resolve(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.ts.as_deref())
    }
}

fn require_timestamp(timestamp: Option<&str>) -> Result<&str> {
    match timestamp.map(str::trim) {
        Some(ts) if !ts.is_empty() => Ok(ts),
        _ => bail!(
            "Missing timestamp: Please pass a valid timestamp via the CLI using the --timestamp (-t) flag"
        ),
    }
}

impl MessageCli {
    /// Run the message command.
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        let config = ctx.load_config()?;
        let (client, channel) = ctx.bot_client(&config)?;

        match self.subcommand {
            MessageSubcommand::Post(args) => {
                print_info("Posting message...");
                let mut content = SlackMessageContent::new().with_text(args.text.resolve());
                if let Some(icon_emoji) = args.icon_emoji {
                    content = content.with_icon_emoji(icon_emoji);
                }
                let receipt = client.send(&channel, content).await?;
                print_success("Message sent successfully!");
                print_dim("Use the timestamp to update, reply to or delete the message");
                println!("{}", receipt.ts);
            }
            MessageSubcommand::Formatted(args) => {
                print_info("Posting formatted message...");
                let content = formatted_message(&args.header, args.text.resolve());
                let receipt = client.send(&channel, content).await?;
                print_success("Message sent successfully!");
                println!("{}", receipt.ts);
            }
            MessageSubcommand::Reply(args) => {
                let ts = require_timestamp(args.timestamp.as_deref())?;
                print_info("Replying to message...");
                let receipt = client
                    .reply_to_message(&channel, ts, args.text.resolve())
                    .await?;
                print_success("Reply sent successfully!");
                println!("{}", receipt.ts);
            }
            MessageSubcommand::Update(args) => {
                let ts = require_timestamp(args.timestamp.as_deref())?;
                print_info("Updating message...");
                client
                    .update_message(&channel, ts, args.text.resolve())
                    .await?;
                print_success("Message updated successfully!");
            }
            MessageSubcommand::Schedule(args) => {
                let post_at = parse_post_at(require_timestamp(args.timestamp.as_deref())?)?;
                print_info("Scheduling message...");
                let scheduled = client
                    .schedule_message(&channel, post_at, args.text.resolve())
                    .await?;
                print_success("Message scheduled successfully!");
                println!("Timestamp: {}", scheduled.post_at);
                if let Some(date) = human_readable_timestamp(scheduled.post_at) {
                    println!("Date: {}", date);
                }
                if let Some(id) = scheduled.scheduled_message_id {
                    println!("Scheduled message ID: {}", id);
                }
            }
            MessageSubcommand::Delete(args) => {
                let ts = require_timestamp(args.resolve())?;
                print_info("Deleting message...");
                client.delete_message(&channel, ts).await?;
                print_success("Message deleted successfully!");
            }
        }
        Ok(())
    }
}
