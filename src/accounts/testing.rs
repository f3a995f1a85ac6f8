//! In-memory account database for handler tests

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tempfile::TempDir;

use super::system::{AccountDirectory, HomeArchiver};
use crate::config::AppConfig;
use crate::context::Context;

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub primary_group: String,
    pub groups: BTreeSet<String>,
    pub secret: Option<String>,
    pub shell: String,
    pub home: PathBuf,
}

/// Fake `AccountDirectory`. Homes are real directories under `home_root`
/// so permission changes can be observed.
#[derive(Debug)]
pub struct FakeDirectory {
    home_root: PathBuf,
    users: RefCell<BTreeMap<String, FakeUser>>,
    groups: RefCell<BTreeSet<String>>,
    failing: RefCell<BTreeSet<&'static str>>,
    calls: RefCell<Vec<String>>,
}

impl FakeDirectory {
    pub fn new(home_root: &Path) -> Self {
        Self {
            home_root: home_root.to_path_buf(),
            users: RefCell::new(BTreeMap::new()),
            groups: RefCell::new(BTreeSet::new()),
            failing: RefCell::new(BTreeSet::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_group(self, group: &str) -> Self {
        self.groups.borrow_mut().insert(group.to_string());
        self
    }

    /// Seed an existing account whose primary group is its own name.
    pub fn with_user(self, username: &str) -> Self {
        let home = self.home_root.join(username);
        std::fs::create_dir_all(&home).expect("create fake home");
        self.groups.borrow_mut().insert(username.to_string());
        self.users.borrow_mut().insert(
            username.to_string(),
            FakeUser {
                primary_group: username.to_string(),
                groups: BTreeSet::from([username.to_string()]),
                secret: None,
                shell: "/bin/bash".to_string(),
                home,
            },
        );
        self
    }

    /// Make every call of the named operation fail, e.g. `"create"`.
    pub fn failing(self, operation: &'static str) -> Self {
        self.failing.borrow_mut().insert(operation);
        self
    }

    pub fn user(&self, username: &str) -> Option<FakeUser> {
        self.users.borrow().get(username).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any call of the named mutating operation was attempted
    pub fn called(&self, operation: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| call.split(' ').next() == Some(operation))
    }

    fn mutate(&self, operation: &'static str, detail: String) -> Result<()> {
        self.calls.borrow_mut().push(format!("{operation} {detail}"));
        if self.failing.borrow().contains(operation) {
            bail!("{operation} failed for {detail}");
        }
        Ok(())
    }
}

impl AccountDirectory for FakeDirectory {
    fn user_exists(&self, username: &str) -> Result<bool> {
        Ok(self.users.borrow().contains_key(username))
    }

    fn home_dir_of(&self, username: &str) -> Result<Option<PathBuf>> {
        Ok(self.users.borrow().get(username).map(|u| u.home.clone()))
    }

    fn primary_group_of(&self, username: &str) -> Result<Option<String>> {
        Ok(self
            .users
            .borrow()
            .get(username)
            .map(|u| u.primary_group.clone()))
    }

    fn group_exists(&self, group: &str) -> Result<bool> {
        Ok(self.groups.borrow().contains(group))
    }

    fn create(&self, username: &str, shell: &str) -> Result<()> {
        self.mutate("create", username.to_string())?;
        let home = self.home_root.join(username);
        std::fs::create_dir_all(&home)?;
        self.groups.borrow_mut().insert(username.to_string());
        self.users.borrow_mut().insert(
            username.to_string(),
            FakeUser {
                primary_group: username.to_string(),
                groups: BTreeSet::from([username.to_string()]),
                secret: None,
                shell: shell.to_string(),
                home,
            },
        );
        Ok(())
    }

    fn set_secret(&self, username: &str, secret: &str) -> Result<()> {
        self.mutate("set_secret", username.to_string())?;
        match self.users.borrow_mut().get_mut(username) {
            Some(user) => user.secret = Some(secret.to_string()),
            None => bail!("no such user {username}"),
        }
        Ok(())
    }

    fn delete(&self, username: &str) -> Result<()> {
        self.mutate("delete", username.to_string())?;
        let Some(user) = self.users.borrow_mut().remove(username) else {
            bail!("no such user {username}");
        };
        std::fs::remove_dir_all(&user.home)?;
        Ok(())
    }

    fn add_to_group(&self, username: &str, group: &str) -> Result<()> {
        self.mutate("add_to_group", format!("{username} {group}"))?;
        match self.users.borrow_mut().get_mut(username) {
            Some(user) => {
                user.groups.insert(group.to_string());
            }
            None => bail!("no such user {username}"),
        }
        Ok(())
    }

    fn remove_from_group(&self, username: &str, group: &str) -> Result<()> {
        self.mutate("remove_from_group", format!("{username} {group}"))?;
        match self.users.borrow_mut().get_mut(username) {
            Some(user) => {
                user.groups.remove(group);
            }
            None => bail!("no such user {username}"),
        }
        Ok(())
    }
}

/// Records archive requests and writes a placeholder file.
#[derive(Debug, Default)]
pub struct FakeArchiver {
    pub fail: bool,
    pub archived: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl HomeArchiver for FakeArchiver {
    fn archive(&self, source: &Path, destination: &Path) -> Result<()> {
        self.archived
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf()));
        if self.fail {
            bail!("tar failed");
        }
        std::fs::write(destination, b"archive")?;
        Ok(())
    }
}

/// Scratch workspace: a prepared `Context` rooted in a temp dir and a
/// separate directory for fake homes.
pub struct Workspace {
    pub dir: TempDir,
    pub ctx: Context,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = AppConfig {
            base_dir: dir.path().join("state"),
            ..AppConfig::default()
        };
        let ctx = Context::new(config, true);
        ctx.prepare().expect("prepare layout");
        Self { dir, ctx }
    }

    pub fn homes(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    pub fn directory(&self) -> FakeDirectory {
        FakeDirectory::new(&self.homes())
    }

    pub fn errors(&self) -> Vec<String> {
        read_lines(&self.ctx.paths().errors_log())
    }

    pub fn actions(&self) -> Vec<String> {
        read_lines(&self.ctx.paths().actions_log())
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
