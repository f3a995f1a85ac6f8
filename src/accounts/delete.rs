use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;

use super::models::AccountError;
use super::system::{AccountDirectory, HomeArchiver};
use crate::common::paths::file_stamp;
use crate::context::Context;
use crate::ui::prelude::*;

const CODE: &str = "accounts.delete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Missing argument or unknown account; nothing was touched
    Rejected,
    Cancelled,
    Deleted { backup: PathBuf },
    Failed,
}

/// Delete an account after confirmation, backing up its home first.
///
/// `confirm` receives the prompt text and decides whether to go ahead.
/// The backup is best effort: a failing archive does not stop the removal.
pub fn delete_account(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    archiver: &dyn HomeArchiver,
    username: Option<&str>,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<DeleteOutcome> {
    let log = ctx.log();

    let Some(username) = username else {
        log.error(
            CODE,
            &AccountError::MissingArgument("delete <username>").to_string(),
        );
        return Ok(DeleteOutcome::Rejected);
    };

    if !directory.user_exists(username)? {
        log.error(CODE, &AccountError::UnknownUser(username.to_string()).to_string());
        return Ok(DeleteOutcome::Rejected);
    }

    let token = &ctx.config().confirm_token;
    let prompt = format!("Are you sure you want to delete user {username}? ({token} to confirm)");
    if !confirm(&prompt)? {
        log.info(CODE, &format!("Deletion of user {username} cancelled"));
        return Ok(DeleteOutcome::Cancelled);
    }

    let backup = ctx
        .paths()
        .home_backup(username, &file_stamp(Local::now()));
    backup_home(directory, archiver, username, &backup);

    match directory.delete(username) {
        Ok(()) => {
            log.info(
                CODE,
                &format!(
                    "User {username} deleted. Home directory backed up to {}",
                    backup.display()
                ),
            );
            Ok(DeleteOutcome::Deleted { backup })
        }
        Err(err) => {
            log.error(CODE, &format!("Failed to delete user {username}: {err:#}"));
            Ok(DeleteOutcome::Failed)
        }
    }
}

fn backup_home(
    directory: &dyn AccountDirectory,
    archiver: &dyn HomeArchiver,
    username: &str,
    backup: &std::path::Path,
) {
    let result = directory.home_dir_of(username).and_then(|home| match home {
        Some(home) if home.exists() => archiver.archive(&home, backup),
        _ => Ok(()),
    });

    if let Err(err) = result {
        emit(
            Level::Debug,
            "accounts.delete.backup_failed",
            &format!("Backup of {username} home failed: {err:#}"),
            None,
        );
    }
}
