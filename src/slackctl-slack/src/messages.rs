//! Message content for Slack.
//!
//! Provides utilities for:
//! - Escaping text for Slack's control characters
//! - Building Block Kit messages
//! - Validating message timestamps before a request is made

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{SlackError, SlackResult};

/// Default text used when no message is given.
pub const DEFAULT_MESSAGE: &str = "Beep boop this is a test";

/// Default header of a formatted message.
pub const DEFAULT_FORMATTED_HEADER: &str = "*Preformatted Slack Header*";

/// Escape the three characters Slack treats as control sequences.
///
/// `&` is replaced first so that the entities produced for `<` and `>` are
/// not escaped twice.
///
/// # Example
///
/// ```rust
/// use slackctl_slack::escape_special_characters;
///
/// assert_eq!(escape_special_characters("a < b & c"), "a &lt; b &amp; c");
/// ```
pub fn escape_special_characters(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Slack Block Kit block types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackBlock {
    /// Header block.
    Header { text: SlackTextObject },
    /// Section block (main content).
    Section { text: SlackTextObject },
    /// Divider block.
    Divider {},
    /// Context block (small text).
    Context { elements: Vec<SlackTextObject> },
}

/// Slack text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackTextObject {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl SlackTextObject {
    /// Create a plain text object.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text".to_string(),
            text: text.into(),
            emoji: Some(true),
        }
    }

    /// Create a mrkdwn text object.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn".to_string(),
            text: text.into(),
            emoji: None,
        }
    }
}

/// Content of a `chat.postMessage` or `chat.update` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackMessageContent {
    /// Message text, or fallback text when blocks are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Block Kit blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<SlackBlock>>,
    /// Thread timestamp (for replies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Emoji to use as the bot icon. Needs the `chat:write.customize` scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

impl SlackMessageContent {
    /// Create a new message content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set message text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set blocks.
    pub fn with_blocks(mut self, blocks: Vec<SlackBlock>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    /// Set thread timestamp (for replies).
    pub fn in_thread(mut self, thread_ts: impl Into<String>) -> Self {
        self.thread_ts = Some(thread_ts.into());
        self
    }

    /// Set the icon emoji, e.g. `:robot_face:`.
    pub fn with_icon_emoji(mut self, icon_emoji: impl Into<String>) -> Self {
        self.icon_emoji = Some(icon_emoji.into());
        self
    }

    /// Check that there is something to send.
    pub fn validate(&self) -> SlackResult<()> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_blocks = self.blocks.as_ref().is_some_and(|b| !b.is_empty());
        if !has_text && !has_blocks {
            return Err(SlackError::Validation(
                "Message has neither text nor blocks".to_string(),
            ));
        }
        if let Some(thread_ts) = &self.thread_ts {
            validate_message_ts(thread_ts)?;
        }
        Ok(())
    }
}

/// Builder for creating Block Kit messages.
pub struct SlackMessageBuilder {
    blocks: Vec<SlackBlock>,
    fallback_text: Option<String>,
}

impl SlackMessageBuilder {
    /// Create a new message builder.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            fallback_text: None,
        }
    }

    /// Set fallback text for notifications.
    pub fn fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }

    /// Add a header block.
    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(SlackBlock::Header {
            text: SlackTextObject::plain(text),
        });
        self
    }

    /// Add a section with mrkdwn text.
    pub fn section(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(SlackBlock::Section {
            text: SlackTextObject::mrkdwn(text),
        });
        self
    }

    /// Add a divider.
    pub fn divider(mut self) -> Self {
        self.blocks.push(SlackBlock::Divider {});
        self
    }

    /// Add a context block.
    pub fn context(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(SlackBlock::Context {
            elements: vec![SlackTextObject::mrkdwn(text)],
        });
        self
    }

    /// Build the message content.
    pub fn build(self) -> SlackMessageContent {
        SlackMessageContent {
            text: self.fallback_text,
            blocks: Some(self.blocks),
            ..SlackMessageContent::default()
        }
    }
}

impl Default for SlackMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message as a mrkdwn header, a divider and a mrkdwn body.
///
/// Both texts are escaped; mrkdwn markup such as `*bold*` still applies.
pub fn formatted_message(header: &str, body: &str) -> SlackMessageContent {
    SlackMessageBuilder::new()
        .fallback(escape_special_characters(body))
        .section(escape_special_characters(header))
        .divider()
        .section(escape_special_characters(body))
        .build()
}

/// Check a message timestamp (`ts`) such as `1712345678.123456`.
pub fn validate_message_ts(ts: &str) -> SlackResult<()> {
    let (seconds, fraction) = match ts.split_once('.') {
        Some((seconds, fraction)) => (seconds, Some(fraction)),
        None => (ts, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if all_digits(seconds) && fraction.is_none_or(all_digits) {
        Ok(())
    } else if ts.is_empty() {
        Err(SlackError::Validation(
            "Missing timestamp: pass the message timestamp with --timestamp (-t)".to_string(),
        ))
    } else {
        Err(SlackError::Validation(format!(
            "Invalid message timestamp '{}': expected digits with an optional fraction",
            ts
        )))
    }
}

/// Parse a unix timestamp for `chat.scheduleMessage`.
pub fn parse_post_at(value: &str) -> SlackResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(post_at) if post_at > 0 => Ok(post_at),
        _ => Err(SlackError::Validation(format!(
            "Invalid schedule time '{}': expected a unix timestamp in seconds",
            value
        ))),
    }
}

/// Render a unix timestamp as `DD/MM/YYYY HH:MM:SS` in local time.
pub fn human_readable_timestamp(unix_secs: i64) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0).map(|utc| {
        utc.with_timezone(&Local)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_special_characters("plain"), "plain");
        assert_eq!(escape_special_characters("<@U123>"), "&lt;@U123&gt;");
        assert_eq!(escape_special_characters("&lt;"), "&amp;lt;");
        assert_eq!(escape_special_characters("*bold*"), "*bold*");
    }

    #[test]
    fn test_message_builder() {
        let message = SlackMessageBuilder::new()
            .fallback("Test message")
            .header("Test Header")
            .section("Test content")
            .divider()
            .context("Test context")
            .build();

        assert_eq!(message.text, Some("Test message".to_string()));
        assert_eq!(message.blocks.map(|b| b.len()), Some(4));
    }

    #[test]
    fn test_formatted_message_layout() {
        let message = formatted_message(DEFAULT_FORMATTED_HEADER, "a > b");
        let blocks = message.blocks.clone().unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[0],
            SlackBlock::Section {
                text: SlackTextObject::mrkdwn("*Preformatted Slack Header*")
            }
        );
        assert_eq!(blocks[1], SlackBlock::Divider {});
        assert_eq!(
            blocks[2],
            SlackBlock::Section {
                text: SlackTextObject::mrkdwn("a &gt; b")
            }
        );
    }

    #[test]
    fn test_block_serialization() {
        let json = serde_json::to_value(SlackBlock::Divider {}).unwrap();
        assert_eq!(json, serde_json::json!({"type": "divider"}));

        let json = serde_json::to_value(SlackBlock::Section {
            text: SlackTextObject::mrkdwn("hi"),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "section", "text": {"type": "mrkdwn", "text": "hi"}})
        );
    }

    #[test]
    fn test_content_serialization_skips_unset() {
        let content = SlackMessageContent::new()
            .with_text("Reply")
            .in_thread("1234567890.123456");
        let json = serde_json::to_value(&content).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"text": "Reply", "thread_ts": "1234567890.123456"})
        );
    }

    #[test]
    fn test_content_validate() {
        assert!(SlackMessageContent::new().validate().is_err());
        assert!(SlackMessageContent::new().with_text("  ").validate().is_err());
        assert!(SlackMessageContent::new().with_text("hi").validate().is_ok());
        assert!(
            SlackMessageContent::new()
                .with_text("hi")
                .in_thread("nope")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_message_ts() {
        assert!(validate_message_ts("1712345678.123456").is_ok());
        assert!(validate_message_ts("1712345678").is_ok());

        assert!(validate_message_ts("").is_err());
        assert!(validate_message_ts("abc").is_err());
        assert!(validate_message_ts("123.").is_err());
        assert!(validate_message_ts(".123").is_err());
        assert!(validate_message_ts("1.2.3").is_err());
    }

    #[test]
    fn test_parse_post_at() {
        assert_eq!(parse_post_at("1712345678").unwrap(), 1712345678);
        assert!(parse_post_at("0").is_err());
        assert!(parse_post_at("-5").is_err());
        assert!(parse_post_at("tomorrow").is_err());
    }

    #[test]
    fn test_human_readable_timestamp_shape() {
        let rendered = human_readable_timestamp(1_700_000_000).unwrap();
        // DD/MM/YYYY HH:MM:SS, exact value depends on the local timezone
        assert_eq!(rendered.len(), 19);
        assert_eq!(&rendered[2..3], "/");
        assert_eq!(&rendered[5..6], "/");
        assert!(rendered[6..10].starts_with("2023"));
    }
}
