//! slackctl - Main entry point.
//!
//! Posts, updates, replies to, schedules and deletes Slack messages, and
//! builds, updates and validates Slack apps from a manifest. Credentials
//! and IDs are read from an env file; the app configuration refresh token
//! is rotated and saved back to that file on every app command.

use anyhow::Result;
use clap::Parser;

use slackctl_cli::cli::{Cli, dispatch_command};

/// Crates whose logs are shown when `RUST_LOG` is set.
const LOG_TARGETS: &[&str] = &["slackctl", "slackctl_cli", "slackctl_slack", "slackctl_env_store"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = cli.effective_log_level();

    let filter_str = if std::env::var("RUST_LOG").is_ok() {
        let mut directives = vec!["error".to_string()];
        directives.extend(
            LOG_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, log_level.as_filter_str())),
        );
        directives.join(",")
    } else {
        log_level.as_filter_str().to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(&filter_str)
        .with_writer(std::io::stderr)
        .init();

    dispatch_command(cli).await
}
