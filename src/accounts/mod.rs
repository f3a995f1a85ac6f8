//! Account lifecycle handlers
//!
//! Each handler takes the explicit [`Context`](crate::context::Context) and an
//! [`AccountDirectory`](system::AccountDirectory) so it can run against the real system or a fake.
//! Precondition failures are logged and end the operation; only
//! infrastructure failures are returned as errors.

pub mod create;
pub mod delete;
pub mod groups;
pub mod models;
pub mod password;
pub mod system;

#[cfg(test)]
pub mod testing;

pub use system::{OsAccountDirectory, TarArchiver};
