// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::io::IsTerminal;

use console::Term;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};
use sso_idp_client::{PromptError, Prompter};

/// Asks questions on the terminal attached to stderr, so that stdout only
/// carries the assertion.
pub struct TerminalPrompter {
    term: Term,
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
        }
    }

    /// Whether someone can actually answer the prompts
    pub fn is_interactive() -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }

    pub fn username(&self) -> Result<String, PromptError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt("Username")
            .interact_text_on(&self.term)
            .map_err(into_prompt_error)
    }

    pub fn password(&self) -> Result<String, PromptError> {
        Password::with_theme(&self.theme)
            .with_prompt("Password")
            .interact_on(&self.term)
            .map_err(into_prompt_error)
    }
}

impl Prompter for TerminalPrompter {
    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize, PromptError> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_on_opt(&self.term)
            .map_err(into_prompt_error)?
            .ok_or(PromptError::Cancelled)
    }

    fn required_string(&self, prompt: &str) -> Result<String, PromptError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .validate_with(|input: &String| {
                if input.trim().is_empty() {
                    Err("a value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text_on(&self.term)
            .map(|input| input.trim().to_owned())
            .map_err(into_prompt_error)
    }
}

fn into_prompt_error(error: dialoguer::Error) -> PromptError {
    match error {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            PromptError::Cancelled
        }
        dialoguer::Error::IO(e) => PromptError::Other(Box::new(e)),
    }
}
