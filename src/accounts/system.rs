use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::models::PasswdEntry;
use crate::ui::prelude::*;

/// Capability interface over the OS account database.
///
/// Queries return `Ok(None)`/`Ok(false)` for absent entries; mutations
/// return an error when the underlying tool fails.
pub trait AccountDirectory {
    fn user_exists(&self, username: &str) -> Result<bool>;

    fn home_dir_of(&self, username: &str) -> Result<Option<PathBuf>>;

    fn primary_group_of(&self, username: &str) -> Result<Option<String>>;

    fn group_exists(&self, group: &str) -> Result<bool>;

    /// Create the account with a home directory and login shell
    fn create(&self, username: &str, shell: &str) -> Result<()>;

    fn set_secret(&self, username: &str, secret: &str) -> Result<()>;

    /// Remove the account together with its home directory
    fn delete(&self, username: &str) -> Result<()>;

    fn add_to_group(&self, username: &str, group: &str) -> Result<()>;

    fn remove_from_group(&self, username: &str, group: &str) -> Result<()>;
}

/// Packs a home directory into a compressed archive.
pub trait HomeArchiver {
    fn archive(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// `AccountDirectory` backed by getent, id, useradd, chpasswd, userdel,
/// usermod and gpasswd.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsAccountDirectory;

impl OsAccountDirectory {
    fn passwd_entry(&self, username: &str) -> Result<Option<PasswdEntry>> {
        let Some(line) = query("getent", &["passwd", username])
            .with_context(|| format!("querying passwd entry for {username}"))?
        else {
            return Ok(None);
        };
        Ok(PasswdEntry::parse(&line).filter(|entry| entry.name == username))
    }
}

impl AccountDirectory for OsAccountDirectory {
    fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.passwd_entry(username)?.is_some())
    }

    fn home_dir_of(&self, username: &str) -> Result<Option<PathBuf>> {
        Ok(self.passwd_entry(username)?.map(|entry| entry.home))
    }

    fn primary_group_of(&self, username: &str) -> Result<Option<String>> {
        query("id", &["-gn", username])
            .with_context(|| format!("querying primary group of {username}"))
    }

    fn group_exists(&self, group: &str) -> Result<bool> {
        let found = query("getent", &["group", group])
            .with_context(|| format!("checking group {group}"))?;
        Ok(found.is_some())
    }

    fn create(&self, username: &str, shell: &str) -> Result<()> {
        run_tool("useradd", &["-m", "-s", shell, username], None)
    }

    fn set_secret(&self, username: &str, secret: &str) -> Result<()> {
        run_tool("chpasswd", &[], Some(chpasswd_line(username, secret)?))
    }

    fn delete(&self, username: &str) -> Result<()> {
        run_tool("userdel", &["-r", username], None)
    }

    fn add_to_group(&self, username: &str, group: &str) -> Result<()> {
        run_tool("usermod", &["-a", "-G", group, username], None)
    }

    fn remove_from_group(&self, username: &str, group: &str) -> Result<()> {
        run_tool("gpasswd", &["-d", username, group], None)
    }
}

/// `HomeArchiver` producing gzip tarballs with `tar`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarArchiver;

impl HomeArchiver for TarArchiver {
    fn archive(&self, source: &Path, destination: &Path) -> Result<()> {
        let parent = source.parent().unwrap_or_else(|| Path::new("/"));
        let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
            bail!("cannot archive {}", source.display());
        };
        let parent = parent.to_string_lossy().into_owned();
        let destination = destination.to_string_lossy().into_owned();
        run_tool(
            "tar",
            &["-czf", destination.as_str(), "-C", parent.as_str(), name],
            None,
        )
    }
}

/// chpasswd reads one `user:password` pair per line.
fn chpasswd_line(username: &str, secret: &str) -> Result<String> {
    if username.contains(['\n', '\r', ':']) {
        bail!("refusing to set password: invalid username {username:?}");
    }
    if secret.contains(['\n', '\r']) {
        bail!("refusing to set password for {username}: password contains a line break");
    }
    Ok(format!("{username}:{secret}\n"))
}

/// Run a read-only lookup. A non-zero exit means "not found".
fn query(program: &str, args: &[&str]) -> Result<Option<String>> {
    emit(
        Level::Debug,
        "accounts.query",
        &format!("$ {} {}", program, args.join(" ")),
        None,
    );

    let output = duct::cmd(program, args.iter().copied())
        .stdout_capture()
        .stderr_null()
        .unchecked()
        .run()
        .with_context(|| format!("running {program}"))?;

    if !output.status.success() {
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
}

/// Run a mutating tool, turning a non-zero exit into an error carrying its stderr.
fn run_tool(program: &str, args: &[&str], stdin: Option<String>) -> Result<()> {
    emit(
        Level::Debug,
        "accounts.command",
        &format!("$ {} {}", program, args.join(" ")),
        None,
    );

    let mut expression = duct::cmd(program, args.iter().copied())
        .stdout_null()
        .stderr_capture()
        .unchecked();
    if let Some(input) = stdin {
        expression = expression.stdin_bytes(input);
    }

    let output = expression
        .run()
        .with_context(|| format!("running {program}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} failed ({}): {}", output.status, stderr.trim());
    }

    Ok(())
}
