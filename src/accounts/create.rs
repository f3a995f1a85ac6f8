use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::models::{AccountError, AccountRecord};
use super::system::AccountDirectory;
use crate::common::files::append_line;
use crate::context::Context;
use crate::ui::prelude::*;

const CODE: &str = "accounts.create";
const HEADER_FIRST_FIELD: &str = "Firstname";
const HOME_MODE: u32 = 0o700;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Create one account per record in `source`.
///
/// Individual record failures are logged and never stop the batch.
pub fn create_accounts(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    source: &Path,
) -> Result<BatchOutcome> {
    let log = ctx.log();
    let mut outcome = BatchOutcome::default();

    if !source.exists() {
        log.error(
            CODE,
            &AccountError::InputFileMissing(source.to_path_buf()).to_string(),
        );
        return Ok(outcome);
    }

    for entry in read_records(source)? {
        let record = match entry {
            Ok(record) => record,
            Err(err) => {
                log.error(CODE, &err.to_string());
                outcome.failed += 1;
                continue;
            }
        };

        let username = record.username();
        match provision(ctx, directory, &record, &username) {
            Ok(true) => outcome.created += 1,
            Ok(false) => outcome.skipped += 1,
            Err(err) => {
                log.error(CODE, &format!("{err:#}"));
                outcome.failed += 1;
            }
        }
    }

    emit(
        Level::Success,
        "accounts.create.done",
        &format!(
            "Batch complete: {} created, {} skipped, {} failed",
            outcome.created, outcome.skipped, outcome.failed
        ),
        Some(serde_json::json!({
            "created": outcome.created,
            "skipped": outcome.skipped,
            "failed": outcome.failed,
        })),
    );

    Ok(outcome)
}

/// Returns `Ok(false)` when the account already exists.
fn provision(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    record: &AccountRecord,
    username: &str,
) -> Result<bool> {
    if directory.user_exists(username)? {
        ctx.log()
            .error(CODE, &AccountError::AlreadyExists(username.to_string()).to_string());
        return Ok(false);
    }

    directory
        .create(username, &ctx.config().default_shell)
        .with_context(|| format!("Failed to create user {username}"))?;
    directory
        .set_secret(username, &record.secret)
        .with_context(|| format!("Failed to set password for {username}"))?;

    let home = directory
        .home_dir_of(username)?
        .ok_or_else(|| AccountError::NoHome(username.to_string()))?;
    restrict_home(&home)?;

    ctx.log().info(
        CODE,
        &format!("User {username} created (email: {}, tier: {})", record.email, record.tier),
    );
    append_line(&ctx.paths().created_users(), &record.created_line(username))?;

    Ok(true)
}

fn restrict_home(home: &Path) -> Result<()> {
    fs::set_permissions(home, Permissions::from_mode(HOME_MODE))
        .with_context(|| format!("Failed to restrict permissions on {}", home.display()))
}

/// Parse the accounts file. Blank rows and a leading `Firstname,...`
/// header are dropped; bad rows come back as errors so the caller can log
/// them and move on.
///
/// Every line is one record: quotes are ordinary characters and the
/// password field is taken verbatim.
pub fn read_records(source: &Path) -> Result<Vec<Result<AccountRecord, AccountError>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(source)
        .with_context(|| format!("opening {}", source.display()))?;

    let mut records = Vec::new();
    let mut rows_seen = 0usize;

    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                records.push(Err(AccountError::UnreadableRecord(err.to_string())));
                continue;
            }
        };

        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        rows_seen += 1;
        if rows_seen == 1 && row.get(0).map(str::trim) == Some(HEADER_FIRST_FIELD) {
            continue;
        }

        if row.len() < 5 {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            records.push(Err(AccountError::MalformedRecord {
                line,
                found: row.len(),
            }));
            continue;
        }

        records.push(Ok(AccountRecord {
            first_name: row[0].trim().to_string(),
            last_name: row[1].trim().to_string(),
            email: row[2].trim().to_string(),
            secret: row[3].trim_end_matches('\r').to_string(),
            tier: row[4].trim().to_string(),
        }));
    }

    Ok(records)
}
