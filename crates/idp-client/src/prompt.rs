// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Interaction with the user during the login flow.

use thiserror::Error;

/// Errors returned by a [`Prompter`].
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user dismissed the prompt.
    #[error("prompt cancelled")]
    Cancelled,

    /// The prompter returned an index outside of the options.
    #[error("invalid choice {index} out of {count} options")]
    InvalidChoice {
        /// The returned index.
        index: usize,
        /// The number of options.
        count: usize,
    },

    /// The terminal or whatever backs the prompter failed.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Asks the user for choices and secrets while the flow runs.
pub trait Prompter: Send + Sync {
    /// Let the user pick one of the `options`, returning its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the user could not be asked.
    fn choose(&self, prompt: &str, options: &[String]) -> Result<usize, PromptError>;

    /// Ask the user for a non-empty string, like a one-time passcode.
    ///
    /// # Errors
    ///
    /// Returns an error if the user could not be asked.
    fn required_string(&self, prompt: &str) -> Result<String, PromptError>;
}

/// Call [`Prompter::choose`] and make sure the index is in range.
pub(crate) fn choose_checked(
    prompter: &dyn Prompter,
    prompt: &str,
    options: &[String],
) -> Result<usize, PromptError> {
    let index = prompter.choose(prompt, options)?;
    if index >= options.len() {
        return Err(PromptError::InvalidChoice {
            index,
            count: options.len(),
        });
    }

    Ok(index)
}
