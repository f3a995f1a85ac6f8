//! Interactive confirmation

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use dialoguer::Input;

/// Ask `prompt` and report whether the answer is exactly `token`.
///
/// Uses a dialoguer prompt on a terminal and a plain line read when stdin is
/// piped, so scripted confirmations keep working.
pub fn confirm_token(prompt: &str, token: &str) -> Result<bool> {
    let answer = if io::stdin().is_terminal() {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("reading confirmation")?
    } else {
        print!("{prompt} ");
        io::stdout().flush().ok();
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading confirmation from stdin")?;
        line
    };

    Ok(answer_matches(&answer, token))
}

pub fn answer_matches(answer: &str, token: &str) -> bool {
    answer.trim() == token
}
