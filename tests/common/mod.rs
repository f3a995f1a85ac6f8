use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Scratch directory with a config file pointing userctl's state into it.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let env = Self { temp_dir };
        std::fs::write(
            env.config_path(),
            format!("base_dir = \"{}\"\n", env.state_dir().display()),
        )?;
        Ok(env)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("userctl.toml")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    /// Run the userctl binary from inside the scratch directory.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let config = self.config_path();
        let output = Command::new(env!("CARGO_BIN_EXE_userctl"))
            .arg("--no-color")
            .arg("--config")
            .arg(&config)
            .args(args)
            .current_dir(self.path())
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

pub fn running_as_root() -> bool {
    matches!(sudo::check(), sudo::RunningAs::Root)
}
