// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Credentials of the user logging in.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The method used to answer a Duo challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuoMethod {
    /// Send a push notification and wait for its approval.
    Push,

    /// Type a passcode.
    Passcode,
}

impl DuoMethod {
    /// All the methods, in the order they are offered to the user.
    pub const ALL: [Self; 2] = [Self::Push, Self::Passcode];

    /// The name of the method in the Duo API.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Push => "Duo Push",
            Self::Passcode => "Passcode",
        }
    }
}

impl fmt::Display for DuoMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The string is neither `Duo Push` nor `Passcode`.
#[derive(Debug, Error)]
#[error("unknown Duo method {0:?}, expected \"Duo Push\" or \"Passcode\"")]
pub struct UnknownDuoMethod(String);

impl FromStr for DuoMethod {
    type Err = UnknownDuoMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duo push" | "push" => Ok(Self::Push),
            "passcode" => Ok(Self::Passcode),
            _ => Err(UnknownDuoMethod(s.to_owned())),
        }
    }
}

/// What the user logs in with.
///
/// The state token is only set when the identity provider asked to restart
/// the flow, in which case the username and password are not sent again.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    state_token: Option<String>,
    duo_method: Option<DuoMethod>,
}

impl Credentials {
    /// Credentials for a fresh login.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            state_token: None,
            duo_method: None,
        }
    }

    /// Answer Duo challenges with this method instead of asking.
    #[must_use]
    pub fn with_duo_method(mut self, duo_method: DuoMethod) -> Self {
        self.duo_method = Some(duo_method);
        self
    }

    /// Resume an existing login flow.
    #[must_use]
    pub fn with_state_token(mut self, state_token: impl Into<String>) -> Self {
        self.state_token = Some(state_token.into());
        self
    }

    /// The username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// The state token of the flow to resume, if any.
    #[must_use]
    pub fn state_token(&self) -> Option<&str> {
        self.state_token.as_deref()
    }

    /// The preselected Duo method, if any.
    #[must_use]
    pub fn duo_method(&self) -> Option<DuoMethod> {
        self.duo_method
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("state_token", &self.state_token.as_ref().map(|_| "[redacted]"))
            .field("duo_method", &self.duo_method)
            .finish()
    }
}
