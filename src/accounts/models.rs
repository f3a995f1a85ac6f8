use std::path::PathBuf;

use thiserror::Error;

/// One row of the accounts file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub secret: String,
    pub tier: String,
}

impl AccountRecord {
    /// System username for this record: lowercased first name followed by
    /// lowercased last name. No further sanitization is applied.
    pub fn username(&self) -> String {
        derive_username(&self.first_name, &self.last_name)
    }

    /// Line appended to the created-accounts report
    pub fn created_line(&self, username: &str) -> String {
        format!("{},{},{},{}", username, self.email, self.tier, self.secret)
    }
}

pub fn derive_username(first: &str, last: &str) -> String {
    format!("{}{}", first.to_lowercase(), last.to_lowercase())
}

/// Fields of a `getent passwd` line that userctl cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub home: PathBuf,
}

impl PasswdEntry {
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split(':').collect();
        if fields.len() < 7 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            home: PathBuf::from(fields[5]),
        })
    }
}

/// Precondition failures. These are logged and end the current operation,
/// they never abort the process.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Missing argument. Usage: {0}")]
    MissingArgument(&'static str),

    #[error("Input file {} not found", .0.display())]
    InputFileMissing(PathBuf),

    #[error("Unreadable record: {0}")]
    UnreadableRecord(String),

    #[error("Malformed record on line {line}: expected 5 fields, found {found}")]
    MalformedRecord { line: u64, found: usize },

    #[error("User {0} already exists, skipping")]
    AlreadyExists(String),

    #[error("User {0} does not exist")]
    UnknownUser(String),

    #[error("Group {0} does not exist")]
    UnknownGroup(String),

    #[error("Cannot remove {user} from primary group {group}")]
    PrimaryGroup { user: String, group: String },

    #[error("No home directory recorded for {0}")]
    NoHome(String),
}
