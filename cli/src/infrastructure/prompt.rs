//! Line-oriented operator input
//!
//! Yes/no questions use `dialoguer` on a terminal and plain line reading
//! when input is piped.

use std::io::{IsTerminal, Write};

use async_trait::async_trait;
use dialoguer::Confirm;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::SessionError;

#[async_trait]
pub trait Prompter: Send {
    /// Show `prompt` and read one line, without its trailing newline
    ///
    /// Returns `None` once input is closed.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>, SessionError>;

    /// Ask a yes/no question; `None` once input is closed
    async fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<Option<bool>, SessionError>;

    /// Show informational text ahead of a question
    fn note(&mut self, text: &str);
}

/// Reads answers from standard input
pub struct StdinPrompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for StdinPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinPrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let line = self.lines.next_line().await?;
        if line.is_none() {
            // Keep the shell prompt off our prompt line
            println!();
        }
        Ok(line)
    }

    async fn confirm(
        &mut self,
        prompt: &str,
        default: bool,
    ) -> Result<Option<bool>, SessionError> {
        if std::io::stdin().is_terminal() {
            let prompt = prompt.to_string();
            let confirmed = tokio::task::spawn_blocking(move || {
                Confirm::new()
                    .with_prompt(prompt)
                    .default(default)
                    .interact()
            })
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;
            return Ok(Some(confirmed));
        }

        let answer = self
            .ask(&format!("{} {}", prompt, confirm_hint(default)))
            .await?;
        Ok(answer.map(|a| parse_confirmation(&a, default)))
    }

    fn note(&mut self, text: &str) {
        println!("{}", text);
    }
}

pub(crate) fn confirm_hint(default: bool) -> &'static str {
    if default {
        "[Y/n]"
    } else {
        "[y/N]"
    }
}

/// Interpret a typed yes/no answer; blank or unrecognised takes `default`
pub(crate) fn parse_confirmation(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}
