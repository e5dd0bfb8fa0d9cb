//! Interactive prompts built on dialoguer
//!
//! Every helper returns an error instead of panicking when the terminal is
//! not interactive or the operator aborts the prompt.

use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Password, Select};
use std::io::{self, IsTerminal};

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Fails early when a workflow needs an answer but stdin is not a terminal
pub fn ensure_interactive(what: &str) -> Result<()> {
    if io::stdin().is_terminal() {
        Ok(())
    } else {
        bail!("{} was not provided and stdin is not a terminal", what)
    }
}

pub fn confirm(message: &str, default: bool) -> Result<bool> {
    ensure_interactive(message)?;
    Confirm::with_theme(&theme())
        .with_prompt(message)
        .default(default)
        .interact()
        .context("reading confirmation")
}

/// Free text input checked by `validate` before it is accepted
pub fn text_validated<F>(message: &str, default: Option<&str>, validate: F) -> Result<String>
where
    F: Fn(&str) -> Result<(), String>,
{
    ensure_interactive(message)?;
    let theme = theme();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(message)
        .validate_with(|text: &String| validate(text.trim()));
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    let answer = input.interact_text().context("reading input")?;
    Ok(answer.trim().to_string())
}

pub fn text(message: &str, default: Option<&str>) -> Result<String> {
    text_validated(message, default, |_| Ok(()))
}

/// Text input that may be left empty
pub fn optional_text(message: &str) -> Result<String> {
    ensure_interactive(message)?;
    let answer: String = Input::with_theme(&theme())
        .with_prompt(message)
        .allow_empty(true)
        .interact_text()
        .context("reading input")?;
    Ok(answer.trim().to_string())
}

pub fn password<F>(message: &str, validate: F) -> Result<String>
where
    F: Fn(&str) -> Result<(), String>,
{
    ensure_interactive(message)?;
    let theme = theme();
    Password::with_theme(&theme)
        .with_prompt(message)
        .validate_with(|text: &String| validate(text))
        .interact()
        .context("reading secret")
}

/// Single choice; returns the index into `items`
pub fn select<T: ToString>(message: &str, items: &[T]) -> Result<usize> {
    if items.is_empty() {
        bail!("Nothing to choose from for: {}", message);
    }
    ensure_interactive(message)?;
    Select::with_theme(&theme())
        .with_prompt(message)
        .items(items)
        .default(0)
        .interact()
        .context("reading selection")
}

/// Multiple choice requiring at least one selected item; returns indices
pub fn multi_select<T: ToString>(message: &str, items: &[T]) -> Result<Vec<usize>> {
    ensure_interactive(message)?;
    loop {
        let chosen = MultiSelect::with_theme(&theme())
            .with_prompt(message)
            .items(items)
            .interact()
            .context("reading selection")?;
        if !chosen.is_empty() {
            return Ok(chosen);
        }
        eprintln!("Select at least one item (space to toggle, enter to confirm)");
    }
}
