//! CLI argument structures and parsing.
//!
//! Defines the top-level command-line structure using clap. Per-command
//! arguments live next to their handlers in the `*_cmd` modules.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use slackctl_env_store::DEFAULT_ENV_FILE;
use slackctl_slack::ApiOptions;

use super::styles::{AFTER_HELP, get_styles};
use crate::app_cmd::AppCli;
use crate::init_cmd::InitCli;
use crate::message_cmd::MessageCli;
use crate::token_cmd::TokenCli;

/// Build-time version string with commit hash and build date.
pub fn get_long_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = match option_env!("SLACKCTL_GIT_HASH") {
        Some(v) => v,
        None => "unknown",
    };
    const BUILD_DATE: &str = match option_env!("SLACKCTL_BUILD_DATE") {
        Some(v) => v,
        None => "unknown",
    };

    static LONG_VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    LONG_VERSION.get_or_init(|| format!("{} ({} {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// slackctl - Slack messages and apps from the command line
#[derive(Debug, Parser)]
#[command(name = "slackctl")]
#[command(author, version, long_version = get_long_version())]
#[command(about = "Post Slack messages and manage Slack apps", long_about = None)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    /// Env file holding Slack credentials and IDs
    #[arg(
        long = "env-file",
        value_name = "PATH",
        default_value = DEFAULT_ENV_FILE,
        global = true
    )]
    pub env_file: PathBuf,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Enable trace-level logging for debugging
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        short = 'L',
        value_enum,
        default_value = "warn",
        global = true
    )]
    pub log_level: LogLevel,

    /// Timeout for Slack API requests in seconds (default: no timeout)
    #[arg(long = "timeout-secs", value_name = "SECONDS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Slack Web API base URL
    #[arg(long = "api-base-url", value_name = "URL", hide = true, global = true)]
    pub api_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level after applying `--trace`, `--verbose` and
    /// `SLACKCTL_LOG_LEVEL`, in that order.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if let Ok(env_level) = std::env::var("SLACKCTL_LOG_LEVEL") {
            LogLevel::from_str_loose(&env_level).unwrap_or(self.log_level)
        } else {
            self.log_level
        }
    }

    /// HTTP options for the Slack clients.
    pub fn api_options(&self) -> ApiOptions {
        let mut options = match &self.api_base_url {
            Some(url) => ApiOptions::with_base_url(url.clone()),
            None => ApiOptions::default(),
        };
        if let Some(secs) = self.timeout_secs {
            options = options.timeout(Duration::from_secs(secs));
        }
        options
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the env file and save the values you already have
    #[command(display_order = 1)]
    Init(InitCli),

    /// Rotate the app configuration token
    #[command(display_order = 2)]
    Token(TokenCli),

    /// Post, update, reply to, schedule or delete messages
    #[command(visible_alias = "msg", display_order = 3)]
    Message(MessageCli),

    /// Build, update or validate the Slack app
    #[command(display_order = 4)]
    App(AppCli),
}
