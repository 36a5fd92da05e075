//! slackctl CLI library module.
//!
//! # Module Organization
//!
//! - `cli/` - CLI argument parsing and command dispatch
//! - `context` - Env file and HTTP options shared by every command
//! - Command modules - Individual CLI commands (`*_cmd.rs`)
//! - `styled_output` - Styled status messages on stderr

pub mod cli;
pub mod context;
pub mod styled_output;

pub mod app_cmd;
pub mod init_cmd;
pub mod message_cmd;
pub mod token_cmd;
