//! App command for slackctl.
//!
//! Every app subcommand reads the manifest first, then rotates the
//! configuration token (saving the new refresh token) and makes one
//! `apps.manifest.*` call with the fresh access token.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use slackctl_env_store::{CredentialStore, EnvFile};
use slackctl_slack::config::KEY_APP_ID;
use slackctl_slack::manifest::DEFAULT_MANIFEST_FILE;
use slackctl_slack::{AppManifest, SlackError, app_install_url};

use crate::context::CommandContext;
use crate::styled_output::{print_dim, print_error, print_info, print_success};

/// App CLI command.
#[derive(Debug, Parser)]
pub struct AppCli {
    #[command(subcommand)]
    pub subcommand: AppSubcommand,
}

/// App subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum AppSubcommand {
    /// Create a new app from the manifest
    #[command(visible_alias = "create")]
    Build(AppBuildArgs),

    /// Replace the manifest of an existing app
    Update(AppUpdateArgs),

    /// Check the manifest without changing any app
    Validate(ManifestArgs),
}

/// Manifest location.
#[derive(Debug, Clone, clap::Args)]
pub struct ManifestArgs {
    /// Path to the app manifest (YAML)
    #[arg(long = "manifest", value_name = "PATH", default_value = DEFAULT_MANIFEST_FILE)]
    pub manifest: PathBuf,
}

/// Arguments for app build command.
#[derive(Debug, Parser)]
pub struct AppBuildArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Save the new app ID to the env file as SLACK_APP_ID
    #[arg(long = "save-app-id")]
    pub save_app_id: bool,
}

/// Arguments for app update command.
#[derive(Debug, Parser)]
pub struct AppUpdateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// App to update (default: SLACK_APP_ID)
    #[arg(long = "app-id", value_name = "ID")]
    pub app_id: Option<String>,
}

impl AppCli {
    /// Run the app command.
    pub async fn run(self, ctx: &CommandContext) -> Result<()> {
        match self.subcommand {
            AppSubcommand::Build(args) => run_build(args, ctx).await,
            AppSubcommand::Update(args) => run_update(args, ctx).await,
            AppSubcommand::Validate(args) => run_validate(args, ctx).await,
        }
    }
}

async fn run_build(args: AppBuildArgs, ctx: &CommandContext) -> Result<()> {
    let manifest = AppManifest::load(&args.manifest.manifest)?;
    let config = ctx.load_config()?;
    let client = ctx.config_client(&config).await?;

    print_info("Building app...");
    let built = client
        .build_app(&manifest)
        .await
        .inspect_err(report_manifest_issues)?;

    print_success(&format!(
        "App built successfully! The app ID is {}.",
        built.app_id
    ));

    if args.save_app_id {
        EnvFile::new(ctx.env_file()).set_value(KEY_APP_ID, &built.app_id)?;
        print_success(&format!(
            "Saved {} to {}",
            KEY_APP_ID,
            ctx.env_file().display()
        ));
    } else {
        print_dim("Pass --save-app-id to save it to the env file for `slackctl app update`");
    }

    print_info(&format!(
        "Install the app to your workspace at {}",
        app_install_url(&built.app_id)
    ));
    println!("{}", built.app_id);
    Ok(())
}

async fn run_update(args: AppUpdateArgs, ctx: &CommandContext) -> Result<()> {
    let manifest = AppManifest::load(&args.manifest.manifest)?;
    let config = ctx.load_config()?;
    let app_id = match args.app_id.as_deref() {
        Some(id) => id,
        None => config.require_app_id()?,
    };
    let client = ctx.config_client(&config).await?;

    print_info(&format!("Updating app {}...", app_id));
    client
        .update_app(app_id, &manifest)
        .await
        .inspect_err(report_manifest_issues)?;

    print_success("App updated successfully!");
    Ok(())
}

async fn run_validate(args: ManifestArgs, ctx: &CommandContext) -> Result<()> {
    let manifest = AppManifest::load(&args.manifest)?;
    let config = ctx.load_config()?;
    let client = ctx.config_client(&config).await?;

    print_info("Validating manifest...");
    client
        .validate_manifest(&manifest)
        .await
        .inspect_err(report_manifest_issues)?;

    print_success("Manifest is valid!");
    Ok(())
}

/// Print the per-field problems Slack reported for a manifest.
fn report_manifest_issues(err: &SlackError) {
    if let SlackError::Api { details, .. } = err {
        for detail in details {
            print_error(detail);
        }
    }
}
