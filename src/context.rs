use anyhow::Result;

use crate::common::paths::Paths;
use crate::config::AppConfig;
use crate::logging::ActionLog;

/// Everything a handler needs, passed explicitly instead of living in globals.
#[derive(Debug)]
pub struct Context {
    config: AppConfig,
    paths: Paths,
    log: ActionLog,
    privileged: bool,
}

impl Context {
    pub fn new(config: AppConfig, privileged: bool) -> Self {
        let paths = Paths::new(&config.base_dir);
        let log = ActionLog::new(&paths);

        Self {
            config,
            paths,
            log,
            privileged,
        }
    }

    /// Create the logs, backups and reports directories.
    pub fn prepare(&self) -> Result<()> {
        self.paths.ensure_dirs()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}
