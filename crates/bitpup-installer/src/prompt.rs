use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// What the user is asked to approve.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmRequest<'a> {
    pub action: &'a str,
    pub packages: &'a [String],
    pub dependencies: &'a [String],
    pub notes: &'a [String],
}

pub trait Prompter {
    /// Returns false when the user refused.
    fn confirm(&self, request: &ConfirmRequest<'_>) -> Result<bool>;
}

/// Only an answer starting with `n`/`N` refuses; anything else continues.
pub fn is_refusal(answer: &str) -> bool {
    answer
        .trim_start()
        .chars()
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(&'n'))
}

/// Reads one answer line. End of input counts as a refusal.
pub fn read_confirmation<R: BufRead>(reader: &mut R) -> Result<bool> {
    let mut answer = String::new();
    let read = reader
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    if read == 0 {
        return Ok(false);
    }
    Ok(!is_refusal(&answer))
}

pub fn render_confirm_request(request: &ConfirmRequest<'_>) -> String {
    let mut out = format!("{}: {}\n", request.action, request.packages.join(" "));
    if !request.dependencies.is_empty() {
        out.push_str(&format!(
            "  dependencies: {}\n",
            request.dependencies.join(" ")
        ));
    }
    for note in request.notes {
        out.push_str(&format!("  {note}\n"));
    }
    out
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, request: &ConfirmRequest<'_>) -> Result<bool> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}Continue? [Y/n] ", render_confirm_request(request))
            .and_then(|()| stdout.flush())
            .context("failed to write confirmation prompt")?;
        drop(stdout);

        read_confirmation(&mut io::stdin().lock())
    }
}
