use sudo::RunningAs;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrivilegeError {
    #[error("This program must be run as root")]
    NeedRoot,
}

pub fn is_root() -> bool {
    matches!(sudo::check(), RunningAs::Root)
}

/// Account tools only work as root; refuse to start otherwise.
pub fn require_root(running_as_root: bool) -> Result<(), PrivilegeError> {
    if running_as_root {
        Ok(())
    } else {
        Err(PrivilegeError::NeedRoot)
    }
}
