use anyhow::Result;
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;

use super::models::AccountError;
use super::system::AccountDirectory;
use crate::common::files::append_line;
use crate::context::Context;

const CODE: &str = "accounts.password";

/// Random password: `bytes` bytes from the OS generator, base64 encoded.
pub fn generate_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    general_purpose::STANDARD.encode(buf)
}

/// Give `username` a fresh random password.
///
/// Returns the new password when it was applied.
pub fn rotate_password(
    ctx: &Context,
    directory: &dyn AccountDirectory,
    username: Option<&str>,
) -> Result<Option<String>> {
    let log = ctx.log();

    let Some(username) = username else {
        log.error(
            CODE,
            &AccountError::MissingArgument("update-pass <username>").to_string(),
        );
        return Ok(None);
    };

    if !directory.user_exists(username)? {
        log.error(CODE, &AccountError::UnknownUser(username.to_string()).to_string());
        return Ok(None);
    }

    let secret = generate_secret(ctx.config().secret_bytes);
    if let Err(err) = directory.set_secret(username, &secret) {
        log.error(
            CODE,
            &format!("Failed to update password for {username}: {err:#}"),
        );
        return Ok(None);
    }

    log.info(CODE, &format!("Password updated for {username}"));
    append_line(
        &ctx.paths().password_changes(),
        &format!("{username},{secret}"),
    )?;

    Ok(Some(secret))
}
