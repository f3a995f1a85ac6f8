use anyhow::Result;

use super::models::AccountError;
use super::system::AccountDirectory;
use crate::context::Context;

const ADD_CODE: &str = "accounts.groups.add";
const REMOVE_CODE: &str = "accounts.groups.remove";

/// Per-group result of an `add-group` call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupOutcome {
    pub applied: Vec<String>,
    pub unknown: Vec<String>,
    pub failed: Vec<String>,
}

/// Split a comma-delimited group list, dropping empty entries.
pub fn parse_group_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add `username` to every existing group in `groups`.
///
/// Unknown groups are reported one by one; the remaining groups are still
/// applied.
pub fn add_groups(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    username: Option<&str>,
    groups: Option<&str>,
) -> Result<GroupOutcome> {
    let log = ctx.log();
    let mut outcome = GroupOutcome::default();

    let groups = groups.map(parse_group_list).filter(|list| !list.is_empty());
    let (Some(username), Some(groups)) = (username, groups) else {
        log.error(
            ADD_CODE,
            &AccountError::MissingArgument("add-group <username> <group1,group2,...>")
                .to_string(),
        );
        return Ok(outcome);
    };

    if !directory.user_exists(username)? {
        log.error(ADD_CODE, &AccountError::UnknownUser(username.to_string()).to_string());
        return Ok(outcome);
    }

    for group in groups {
        if !directory.group_exists(&group)? {
            log.error(ADD_CODE, &AccountError::UnknownGroup(group.clone()).to_string());
            outcome.unknown.push(group);
            continue;
        }

        match directory.add_to_group(username, &group) {
            Ok(()) => {
                log.info(ADD_CODE, &format!("Added {username} to group {group}"));
                outcome.applied.push(group);
            }
            Err(err) => {
                log.error(
                    ADD_CODE,
                    &format!("Failed to add {username} to group {group}: {err:#}"),
                );
                outcome.failed.push(group);
            }
        }
    }

    Ok(outcome)
}

/// Remove `username` from `group`, refusing to touch its primary group.
///
/// Returns whether the membership was removed.
pub fn remove_group(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    username: Option<&str>,
    group: Option<&str>,
) -> Result<bool> {
    let log = ctx.log();

    let group = group.map(str::trim).filter(|g| !g.is_empty());
    let (Some(username), Some(group)) = (username, group) else {
        log.error(
            REMOVE_CODE,
            &AccountError::MissingArgument("remove-group <username> <group>").to_string(),
        );
        return Ok(false);
    };

    if !directory.user_exists(username)? {
        log.error(
            REMOVE_CODE,
            &AccountError::UnknownUser(username.to_string()).to_string(),
        );
        return Ok(false);
    }

    // Group names are case-sensitive, so only an exact match is the primary group.
    if directory.primary_group_of(username)?.as_deref() == Some(group) {
        let err = AccountError::PrimaryGroup {
            user: username.to_string(),
            group: group.to_string(),
        };
        log.error(REMOVE_CODE, &err.to_string());
        return Ok(false);
    }

    match directory.remove_from_group(username, group) {
        Ok(()) => {
            log.info(REMOVE_CODE, &format!("Removed {username} from group {group}"));
            Ok(true)
        }
        Err(err) => {
            log.error(
                REMOVE_CODE,
                &format!("Failed to remove {username} from group {group}: {err:#}"),
            );
            Ok(false)
        }
    }
}
