// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Bodies of the authentication and factor verification API.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::factor::Factor;

/// A hypermedia link.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Target of the link.
    pub href: Url,
}

/// An opaque token exchanged for a browser session once the user is
/// authenticated.
///
/// It is single-use and short-lived. Its `Debug` implementation doesn't print
/// it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// The token itself.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

/// Status of a primary authentication or a factor verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AuthnStatus {
    /// The user is authenticated.
    Success,

    /// A second factor must be verified.
    MfaRequired,

    /// Any other status, like `LOCKED_OUT` or `PASSWORD_EXPIRED`.
    Other(String),
}

impl From<String> for AuthnStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SUCCESS" => Self::Success,
            "MFA_REQUIRED" => Self::MfaRequired,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for AuthnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::MfaRequired => f.write_str("MFA_REQUIRED"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// Body of a primary authentication request.
#[derive(Serialize)]
#[serde(untagged)]
pub(crate) enum AuthnRequest<'a> {
    Password {
        username: &'a str,
        password: &'a str,
    },
    StateToken {
        #[serde(rename = "stateToken")]
        state_token: &'a str,
    },
}

/// Embedded resources of an authentication response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthnEmbedded {
    /// The factors enrolled by the user.
    #[serde(default)]
    pub factors: Vec<Factor>,
}

/// Response of the primary authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthnResponse {
    /// Where the flow is at.
    pub status: AuthnStatus,

    /// Present once the user is authenticated.
    #[serde(default)]
    pub session_token: Option<SessionToken>,

    /// Present while the flow needs more steps.
    #[serde(default)]
    pub state_token: Option<String>,

    /// Embedded resources.
    #[serde(rename = "_embedded", default)]
    pub embedded: AuthnEmbedded,
}

/// Body of a factor verification request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyRequest<'a> {
    pub state_token: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_code: Option<&'a str>,
}

/// Response of a factor verification request.
///
/// Only the fields shared by all factors are described here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Where the flow is at.
    #[serde(default)]
    pub status: Option<AuthnStatus>,

    /// Present once the factor is verified.
    #[serde(default)]
    pub session_token: Option<SessionToken>,

    /// Progress of an asynchronous factor, like `WAITING` for a push
    /// notification.
    #[serde(default)]
    pub factor_result: Option<String>,
}
