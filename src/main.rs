mod accounts;
mod common;
mod config;
mod context;
mod logging;
mod privileges;
mod report;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use crate::accounts::{OsAccountDirectory, TarArchiver};
use crate::config::AppConfig;
use crate::context::Context;
use crate::ui::prelude::*;

/// Local account lifecycle management
#[derive(Parser, Debug)]
#[command(name = "userctl", author, version, about, long_about = None)]
struct Cli {
    /// Print every external command before it runs
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for terminal messages
    #[arg(long, global = true, value_enum, default_value_t = FormatArg::Text)]
    format: FormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to a configuration file (defaults to ./userctl.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create accounts from a Firstname,Lastname,Email,Password,Tier file
    Create {
        /// Record file (defaults to accounts.txt)
        file: Option<PathBuf>,
    },
    /// Delete an account after backing up its home directory
    Delete { username: Option<String> },
    /// Generate and apply a new random password
    UpdatePass { username: Option<String> },
    /// Add an account to a comma-separated list of groups
    AddGroup {
        username: Option<String>,
        /// Comma-separated group names
        groups: Option<String>,
    },
    /// Remove an account from a group
    RemoveGroup {
        username: Option<String>,
        group: Option<String>,
    },
    /// Write a summary of created accounts and password changes
    Report,
}

fn print_usage() {
    let _ = Cli::command().print_help();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                print_usage();
                return;
            }
        },
    };

    ui::init(cli.format.into(), !cli.no_color);
    ui::set_debug_mode(cli.debug);

    let Some(command) = cli.command else {
        print_usage();
        return;
    };

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            emit(Level::Error, "config.load_failed", &format!("{err:#}"), None);
            std::process::exit(1);
        }
    };

    let ctx = Context::new(config, privileges::is_root());
    if let Err(err) = privileges::require_root(ctx.is_privileged()) {
        emit(Level::Error, "privileges.need_root", &err.to_string(), None);
        std::process::exit(1);
    }

    if let Err(err) = run(&ctx, command) {
        ctx.log().error("userctl.failed", &format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run(ctx: &Context, command: Commands) -> Result<()> {
    ctx.prepare()?;

    let directory = OsAccountDirectory;

    match command {
        Commands::Create { file } => {
            let source = file.unwrap_or_else(|| ctx.config().accounts_file.clone());
            accounts::create::create_accounts(ctx, &directory, &source)?;
        }
        Commands::Delete { username } => {
            let token = ctx.config().confirm_token.clone();
            accounts::delete::delete_account(
                ctx,
                &directory,
                &TarArchiver,
                username.as_deref(),
                &mut |prompt| ui::prompt::confirm_token(prompt, &token),
            )?;
        }
        Commands::UpdatePass { username } => {
            accounts::password::rotate_password(ctx, &directory, username.as_deref())?;
        }
        Commands::AddGroup { username, groups } => {
            accounts::groups::add_groups(
                ctx,
                &directory,
                username.as_deref(),
                groups.as_deref(),
            )?;
        }
        Commands::RemoveGroup { username, group } => {
            accounts::groups::remove_group(
                ctx,
                &directory,
                username.as_deref(),
                group.as_deref(),
            )?;
        }
        Commands::Report => {
            let summary = report::generate_report(ctx)?;
            emit(
                Level::Success,
                "report.done",
                &format!(
                    "{} accounts created, {} password changes",
                    summary.created, summary.password_changes
                ),
                Some(serde_json::json!({
                    "created": summary.created,
                    "password_changes": summary.password_changes,
                    "path": summary.path,
                })),
            );
        }
    }

    Ok(())
}
