//! Token command.
//!
//! Rotates the app configuration token on demand. App commands rotate
//! automatically; this is for checking the refresh token still works or
//! for getting an access token to use elsewhere.

use anyhow::Result;
use clap::Parser;
use secrecy::ExposeSecret;
use slackctl_env_store::EnvFile;
use slackctl_slack::{ConfigTokenSession, TokenRotator};

use crate::context::{CommandContext, report_unsaved_rotation};
use crate::styled_output::{print_info, print_success};

/// Token CLI command.
#[derive(Debug, Parser)]
pub struct TokenCli {
    #[command(subcommand)]
    pub subcommand: TokenSubcommand,
}

/// Token subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum TokenSubcommand {
    /// Exchange the refresh token for a new access token and refresh token
    Rotate(TokenRotateArgs),
}

/// Arguments for token rotate command.
#[derive(Debug, Parser)]
pub struct TokenRotateArgs {
    /// Print the new access token to stdout
    #[arg(long = "show-access-token")]
    pub show_access_token: bool,
}

impl TokenCli {
    /// Run the token command.
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        match self.subcommand {
            TokenSubcommand::Rotate(args) => run_rotate(args, ctx).await,
        }
    }
}

async fn run_rotate(args: TokenRotateArgs, ctx: &CommandContext) -> Result<()> {
    let config = ctx.load_config()?;
    let refresh_token = config.require_config_refresh_token()?;

    print_info("Rotating config token...");
    let rotator = TokenRotator::new(ctx.options().clone())?;
    let mut session = ConfigTokenSession::new(rotator, EnvFile::new(ctx.env_file()));

    let access_token = session.access_token(refresh_token).await.inspect_err(|err| {
        report_unsaved_rotation(err);
    })?;

    print_success(&format!(
        "Saved new refresh token to {} in {}",
        session.key(),
        ctx.env_file().display()
    ));

    if args.show_access_token {
        println!("{}", access_token.expose_secret());
    }
    Ok(())
}
