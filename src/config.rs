use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Smallest number of random bytes accepted for generated passwords
pub const MIN_SECRET_BYTES: usize = 14;

const LOCAL_CONFIG_FILE: &str = "userctl.toml";

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_accounts_file() -> PathBuf {
    PathBuf::from("accounts.txt")
}

/// Default shell for new accounts
fn default_shell() -> String {
    "/bin/bash".to_string()
}

fn default_secret_bytes() -> usize {
    MIN_SECRET_BYTES
}

fn default_confirm_token() -> String {
    "y".to_string()
}

/// Runtime configuration, read from `userctl.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `logs/`, `backups/` and `reports/`
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Record file read by `create` when no path is given
    #[serde(default = "default_accounts_file")]
    pub accounts_file: PathBuf,
    #[serde(default = "default_shell")]
    pub default_shell: String,
    /// Random bytes per generated password, before base64 encoding
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: usize,
    /// Exact answer required to confirm a deletion
    #[serde(default = "default_confirm_token")]
    pub confirm_token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            accounts_file: default_accounts_file(),
            default_shell: default_shell(),
            secret_bytes: default_secret_bytes(),
            confirm_token: default_confirm_token(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `./userctl.toml` and then
    /// `<config dir>/userctl/config.toml` are tried before falling back to
    /// the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("configuration file {} does not exist", path.display());
            }
            return Self::from_file(path);
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("userctl").join("config.toml"));
        }
        paths
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("parsing configuration at {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.secret_bytes < MIN_SECRET_BYTES {
            bail!(
                "secret_bytes must be at least {MIN_SECRET_BYTES}, got {}",
                self.secret_bytes
            );
        }
        if self.confirm_token.trim().is_empty() {
            bail!("confirm_token must not be empty");
        }
        if self.default_shell.trim().is_empty() {
            bail!("default_shell must not be empty");
        }
        Ok(())
    }
}
