//! Command dispatch.
//!
//! Routes parsed CLI commands to their handlers.

use anyhow::Result;
use tracing::debug;

use super::args::{Cli, Commands};
use crate::context::CommandContext;

/// Dispatch a CLI command to its handler.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let ctx = CommandContext::from_cli(&cli);
    debug!(env_file = %ctx.env_file().display(), "Dispatching command");
    match cli.command {
        Commands::Init(init_cli) => init_cli.run(&ctx),
        Commands::Token(token_cli) => token_cli.run(&ctx).await,
        Commands::Message(message_cli) => message_cli.run(&ctx).await,
        Commands::App(app_cli) => app_cli.run(&ctx).await,
    }
}
