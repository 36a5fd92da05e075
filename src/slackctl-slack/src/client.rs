//! Slack Web API client for message and app operations.
//!
//! Every operation is one POST with a JSON body and a bearer token. A
//! response with `ok: false` becomes [`SlackError::Api`]; nothing is retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use slackctl_slack::{ApiOptions, SlackApiClient};
//!
//! let client = SlackApiClient::new(bot_token, ApiOptions::default())?;
//! let receipt = client.post_message("C0123456", "Hello World!").await?;
//! println!("posted at {}", receipt.ts);
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::ApiOptions;
use crate::error::{ApiOperation, SlackError, SlackResult};
use crate::manifest::AppManifest;
use crate::messages::{SlackBlock, SlackMessageContent, validate_message_ts};

/// Receipt for a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReceipt {
    /// Channel the message landed in.
    pub channel: String,
    /// Message timestamp, used to update, delete or reply to it.
    pub ts: String,
}

/// Receipt for a scheduled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledMessage {
    /// ID that can be used to cancel the scheduled message.
    pub scheduled_message_id: Option<String>,
    /// Unix time the message will be posted at.
    pub post_at: i64,
}

/// Result of building an app from a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltApp {
    /// ID of the new app.
    pub app_id: String,
}

/// A problem reported by `apps.manifest.validate` (and the other manifest
/// methods) for one part of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestIssue {
    /// JSON pointer into the manifest.
    #[serde(default)]
    pub pointer: String,
    /// What is wrong.
    #[serde(default)]
    pub message: String,
    /// Component the problem relates to, if any.
    #[serde(default)]
    pub related_component: Option<String>,
}

impl std::fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error at {}: {}.", self.pointer, self.message)?;
        if let Some(component) = &self.related_component {
            write!(f, " (related component: {})", component)?;
        }
        Ok(())
    }
}

/// Fields of a Web API response that the wrapped operations use.
#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Vec<ManifestIssue>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    app_id: Option<String>,
    #[serde(default)]
    scheduled_message_id: Option<String>,
    #[serde(default)]
    post_at: Option<i64>,
}

/// Client for the wrapped Web API methods, bound to one bearer token.
///
/// Message operations take a bot token (xoxb-...); app operations take a
/// configuration access token obtained from [`crate::TokenRotator`].
#[derive(Clone)]
pub struct SlackApiClient {
    client: reqwest::Client,
    options: ApiOptions,
    token: SecretString,
}

impl std::fmt::Debug for SlackApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackApiClient")
            .field("base_url", &self.options.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl SlackApiClient {
    /// Create a client that authorises every call with `token`.
    pub fn new(token: SecretString, options: ApiOptions) -> SlackResult<Self> {
        if token.expose_secret().trim().is_empty() {
            return Err(SlackError::Validation("Access token is empty".to_string()));
        }
        let client = options.build_client()?;
        Ok(Self {
            client,
            options,
            token,
        })
    }

    /// Post a plain text message to a channel.
    pub async fn post_message(&self, channel: &str, text: &str) -> SlackResult<MessageReceipt> {
        let content = SlackMessageContent::new().with_text(text);
        self.post_content(ApiOperation::PostMessage, channel, content)
            .await
    }

    /// Post a Block Kit message to a channel.
    pub async fn post_blocks(
        &self,
        channel: &str,
        blocks: Vec<SlackBlock>,
    ) -> SlackResult<MessageReceipt> {
        let content = SlackMessageContent::new().with_blocks(blocks);
        self.post_content(ApiOperation::PostMessage, channel, content)
            .await
    }

    /// Reply in the thread of the message posted at `thread_ts`.
    pub async fn reply_to_message(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> SlackResult<MessageReceipt> {
        validate_message_ts(thread_ts)?;
        let content = SlackMessageContent::new()
            .with_text(text)
            .in_thread(thread_ts);
        self.post_content(ApiOperation::ReplyToMessage, channel, content)
            .await
    }

    /// Post arbitrary message content (text, blocks, thread, icon).
    pub async fn send(
        &self,
        channel: &str,
        content: SlackMessageContent,
    ) -> SlackResult<MessageReceipt> {
        let operation = if content.thread_ts.is_some() {
            ApiOperation::ReplyToMessage
        } else {
            ApiOperation::PostMessage
        };
        self.post_content(operation, channel, content).await
    }

    async fn post_content(
        &self,
        operation: ApiOperation,
        channel: &str,
        content: SlackMessageContent,
    ) -> SlackResult<MessageReceipt> {
        validate_channel(channel)?;
        content.validate()?;

        let mut payload = serde_json::to_value(&content)?;
        payload["channel"] = json!(channel);

        let response = self.api_call(operation, &payload).await?;
        let ts = response.ts.ok_or_else(|| {
            SlackError::InvalidPayload(format!("Missing ts in {} response", operation.method()))
        })?;

        Ok(MessageReceipt {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts,
        })
    }

    /// Replace the text of the message posted at `ts`.
    pub async fn update_message(&self, channel: &str, ts: &str, text: &str) -> SlackResult<()> {
        self.update_content(channel, ts, SlackMessageContent::new().with_text(text))
            .await
    }

    /// Replace the content of the message posted at `ts`.
    pub async fn update_content(
        &self,
        channel: &str,
        ts: &str,
        content: SlackMessageContent,
    ) -> SlackResult<()> {
        validate_channel(channel)?;
        validate_message_ts(ts)?;
        content.validate()?;

        let mut payload = serde_json::to_value(&content)?;
        payload["channel"] = json!(channel);
        payload["ts"] = json!(ts);

        self.api_call(ApiOperation::UpdateMessage, &payload).await?;
        Ok(())
    }

    /// Delete the message posted at `ts`.
    pub async fn delete_message(&self, channel: &str, ts: &str) -> SlackResult<()> {
        validate_channel(channel)?;
        validate_message_ts(ts)?;

        let payload = json!({
            "channel": channel,
            "ts": ts,
        });
        self.api_call(ApiOperation::DeleteMessage, &payload).await?;
        Ok(())
    }

    /// Schedule `text` to be posted at unix time `post_at`.
    pub async fn schedule_message(
        &self,
        channel: &str,
        post_at: i64,
        text: &str,
    ) -> SlackResult<ScheduledMessage> {
        validate_channel(channel)?;
        if post_at <= 0 {
            return Err(SlackError::Validation(format!(
                "Invalid schedule time {}: expected a unix timestamp in seconds",
                post_at
            )));
        }
        SlackMessageContent::new().with_text(text).validate()?;

        let payload = json!({
            "channel": channel,
            "post_at": post_at,
            "text": text,
        });
        let response = self
            .api_call(ApiOperation::ScheduleMessage, &payload)
            .await?;

        Ok(ScheduledMessage {
            scheduled_message_id: response.scheduled_message_id,
            post_at: response.post_at.unwrap_or(post_at),
        })
    }

    /// Create a new app from a manifest.
    pub async fn build_app(&self, manifest: &AppManifest) -> SlackResult<BuiltApp> {
        let payload = json!({ "manifest": manifest.as_value() });
        let response = self.api_call(ApiOperation::BuildApp, &payload).await?;

        let app_id = response.app_id.ok_or_else(|| {
            SlackError::InvalidPayload("Missing app_id in apps.manifest.create response".to_string())
        })?;
        Ok(BuiltApp { app_id })
    }

    /// Replace the manifest of an existing app.
    pub async fn update_app(&self, app_id: &str, manifest: &AppManifest) -> SlackResult<()> {
        if app_id.trim().is_empty() {
            return Err(SlackError::Validation("App ID is empty".to_string()));
        }
        let payload = json!({
            "app_id": app_id,
            "manifest": manifest.as_value(),
        });
        self.api_call(ApiOperation::UpdateApp, &payload).await?;
        Ok(())
    }

    /// Check a manifest without creating or changing an app.
    pub async fn validate_manifest(&self, manifest: &AppManifest) -> SlackResult<()> {
        let payload = json!({ "manifest": manifest.as_value() });
        self.api_call(ApiOperation::ValidateManifest, &payload)
            .await?;
        Ok(())
    }

    /// Make an API call to Slack.
    async fn api_call(
        &self,
        operation: ApiOperation,
        payload: &serde_json::Value,
    ) -> SlackResult<ApiEnvelope> {
        let url = self.options.method_url(operation.method());
        debug!("Calling {}", operation.method());

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .header("Content-Type", "application/json; charset=utf-8")
            .json(payload)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(30);
            warn!("{} rate limited", operation.method());
            return Err(SlackError::RateLimited {
                operation,
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api {
                operation,
                code: format!("http_{}", status.as_u16()),
                details: if body.is_empty() { Vec::new() } else { vec![body] },
            });
        }

        let envelope: ApiEnvelope = response.json().await?;
        if !envelope.ok {
            let code = envelope.error.unwrap_or_else(|| "unknown".to_string());
            warn!("{} failed: {}", operation.method(), code);
            return Err(SlackError::Api {
                operation,
                code,
                details: envelope.errors.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(envelope)
    }
}

fn validate_channel(channel: &str) -> SlackResult<()> {
    if channel.trim().is_empty() {
        return Err(SlackError::Validation("Channel ID is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SlackApiClient {
        SlackApiClient::new(
            SecretString::new("xoxb-test".into()),
            ApiOptions::with_base_url(server.uri()),
        )
        .unwrap()
    }

    fn ok_json(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    fn test_manifest() -> AppManifest {
        AppManifest::from_value(json!({"display_information": {"name": "beep"}})).unwrap()
    }

    #[tokio::test]
    async fn test_post_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("Authorization", "Bearer xoxb-test"))
            .and(body_json(json!({"channel": "C1", "text": "hello"})))
            .respond_with(ok_json(
                json!({"ok": true, "channel": "C1", "ts": "1712345678.000100"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client_for(&server)
            .post_message("C1", "hello")
            .await
            .unwrap();

        assert_eq!(receipt.ts, "1712345678.000100");
        assert_eq!(receipt.channel, "C1");
    }

    #[tokio::test]
    async fn test_post_message_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_json(json!({"ok": false, "error": "channel_not_found"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post_message("C404", "hello")
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            SlackError::Api { operation: ApiOperation::PostMessage, code, .. } if code == "channel_not_found"
        ));
        assert_eq!(err.to_string(), "Message failed to send: channel_not_found");
    }

    #[tokio::test]
    async fn test_post_missing_ts_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post_message("C1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, SlackError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_post_blocks() {
        let server = MockServer::start().await;
        let blocks = vec![SlackBlock::Divider {}];
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_json(json!({"channel": "C1", "blocks": [{"type": "divider"}]})))
            .respond_with(ok_json(json!({"ok": true, "ts": "1.2"})))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client_for(&server).post_blocks("C1", blocks).await.unwrap();
        assert_eq!(receipt.ts, "1.2");
    }

    #[tokio::test]
    async fn test_reply_to_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_json(
                json!({"channel": "C1", "thread_ts": "100.200", "text": "reply"}),
            ))
            .respond_with(ok_json(json!({"ok": true, "ts": "100.300"})))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = client_for(&server)
            .reply_to_message("C1", "100.200", "reply")
            .await
            .unwrap();
        assert_eq!(receipt.ts, "100.300");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.update"))
            .and(body_json(json!({"channel": "C1", "ts": "100.200", "text": "edited"})))
            .respond_with(ok_json(json!({"ok": true, "ts": "100.200"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.delete"))
            .and(body_json(json!({"channel": "C1", "ts": "100.200"})))
            .respond_with(ok_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .update_message("C1", "100.200", "edited")
            .await
            .unwrap();
        client.delete_message("C1", "100.200").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_error_wording() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.delete"))
            .respond_with(ok_json(json!({"ok": false, "error": "message_not_found"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_message("C1", "100.200")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Message failed to delete: message_not_found");
    }

    #[tokio::test]
    async fn test_schedule_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.scheduleMessage"))
            .and(body_json(
                json!({"channel": "C1", "post_at": 1712345678, "text": "later"}),
            ))
            .respond_with(ok_json(json!({
                "ok": true,
                "scheduled_message_id": "Q1298393284",
                "post_at": 1712345678
            })))
            .expect(1)
            .mount(&server)
            .await;

        let scheduled = client_for(&server)
            .schedule_message("C1", 1712345678, "later")
            .await
            .unwrap();
        assert_eq!(scheduled.scheduled_message_id.as_deref(), Some("Q1298393284"));
        assert_eq!(scheduled.post_at, 1712345678);
    }

    #[tokio::test]
    async fn test_validation_fails_before_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok_json(json!({"ok": true, "ts": "1.1"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.delete_message("C1", "").await,
            Err(SlackError::Validation(_))
        ));
        assert!(matches!(
            client.update_message("C1", "not-a-ts", "x").await,
            Err(SlackError::Validation(_))
        ));
        assert!(matches!(
            client.post_message("", "x").await,
            Err(SlackError::Validation(_))
        ));
        assert!(matches!(
            client.schedule_message("C1", 0, "x").await,
            Err(SlackError::Validation(_))
        ));
        assert!(matches!(
            client.update_app(" ", &test_manifest()).await,
            Err(SlackError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_build_app() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps.manifest.create"))
            .and(header("Authorization", "Bearer xoxb-test"))
            .and(body_json(
                json!({"manifest": {"display_information": {"name": "beep"}}}),
            ))
            .respond_with(ok_json(json!({"ok": true, "app_id": "A0123"})))
            .expect(1)
            .mount(&server)
            .await;

        let built = client_for(&server)
            .build_app(&test_manifest())
            .await
            .unwrap();
        assert_eq!(built.app_id, "A0123");
    }

    #[tokio::test]
    async fn test_update_app() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps.manifest.update"))
            .and(body_json(json!({
                "app_id": "A0123",
                "manifest": {"display_information": {"name": "beep"}}
            })))
            .respond_with(ok_json(json!({"ok": true, "app_id": "A0123"})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .update_app("A0123", &test_manifest())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validate_manifest_reports_issues() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apps.manifest.validate"))
            .respond_with(ok_json(json!({
                "ok": false,
                "error": "invalid_manifest",
                "errors": [
                    {"message": "must be shorter", "pointer": "/display_information/name"},
                    {"message": "unknown scope", "pointer": "/oauth_config/scopes/bot/0",
                     "related_component": "scopes"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .validate_manifest(&test_manifest())
            .await
            .unwrap_err();

        match err {
            SlackError::Api {
                operation,
                code,
                details,
            } => {
                assert_eq!(operation, ApiOperation::ValidateManifest);
                assert_eq!(code, "invalid_manifest");
                assert_eq!(
                    details,
                    vec![
                        "Error at /display_information/name: must be shorter.".to_string(),
                        "Error at /oauth_config/scopes/bot/0: unknown scope. (related component: scopes)"
                            .to_string(),
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .post_message("C1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SlackError::RateLimited {
                retry_after_secs: 12,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .validate_manifest(&test_manifest())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("http_500"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = SlackApiClient::new(SecretString::new("".into()), ApiOptions::default());
        assert!(matches!(result, Err(SlackError::Validation(_))));
    }

    #[test]
    fn test_client_debug_redacts_token() {
        let client = SlackApiClient::new(
            SecretString::new("xoxb-secret".into()),
            ApiOptions::default(),
        )
        .unwrap();
        assert!(!format!("{:?}", client).contains("xoxb-secret"));
    }
}
