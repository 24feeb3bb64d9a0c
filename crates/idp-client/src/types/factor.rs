// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The second factors this client knows how to verify.

use std::fmt;

use serde::Deserialize;

use super::authn::Link;

/// A second factor, as it is identified by its provider and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactorKind {
    /// Duo web SDK, verified with a handshake against the Duo API.
    Duo,

    /// One-time passcode sent by SMS.
    Sms,

    /// Push notification to the identity provider's mobile app.
    Push,

    /// Google Authenticator TOTP.
    GoogleTotp,

    /// The identity provider's own TOTP.
    OktaTotp,

    /// Symantec VIP hardware or software token.
    SymantecToken,

    /// Anything else. It is listed to the user but can't be verified.
    Unsupported(String),
}

impl FactorKind {
    /// The supported factors, in catalog order.
    pub const SUPPORTED: [Self; 6] = [
        Self::Duo,
        Self::Sms,
        Self::Push,
        Self::GoogleTotp,
        Self::OktaTotp,
        Self::SymantecToken,
    ];

    /// Map a `{provider} {FACTOR TYPE}` identifier to a kind.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Self {
        Self::SUPPORTED
            .into_iter()
            .find(|kind| kind.identifier() == identifier)
            .unwrap_or_else(|| Self::Unsupported(identifier.to_owned()))
    }

    /// The `{provider} {FACTOR TYPE}` identifier of the kind.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Duo => "DUO WEB",
            Self::Sms => "OKTA SMS",
            Self::Push => "OKTA PUSH",
            Self::GoogleTotp => "GOOGLE TOKEN:SOFTWARE:TOTP",
            Self::OktaTotp => "OKTA TOKEN:SOFTWARE:TOTP",
            Self::SymantecToken => "SYMANTEC TOKEN",
            Self::Unsupported(identifier) => identifier,
        }
    }

    /// The label shown to the user, also matched by the MFA preference.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Duo => "DUO MFA authentication".to_owned(),
            Self::Sms => "SMS MFA authentication".to_owned(),
            Self::Push => "PUSH MFA authentication".to_owned(),
            Self::GoogleTotp => "TOTP MFA authentication".to_owned(),
            Self::OktaTotp => "Okta MFA authentication".to_owned(),
            Self::SymantecToken => "Symantec VIP MFA authentication".to_owned(),
            Self::Unsupported(identifier) => format!("UNSUPPORTED: {identifier}"),
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Links of a factor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactorLinks {
    /// Where to send the verification requests.
    pub verify: Option<Link>,
}

/// A factor enrolled by the user, as listed in an `MFA_REQUIRED` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factor {
    /// The ID of the factor.
    pub id: String,

    /// The type of the factor, like `sms` or `token:software:totp`.
    pub factor_type: String,

    /// Who provides the factor, like `OKTA` or `DUO`.
    pub provider: String,

    /// Links of the factor.
    #[serde(rename = "_links", default)]
    pub links: FactorLinks,
}

impl Factor {
    /// The `{provider} {FACTOR TYPE}` identifier of the factor.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{} {}", self.provider, self.factor_type.to_uppercase())
    }

    /// What kind of factor this is.
    #[must_use]
    pub fn kind(&self) -> FactorKind {
        FactorKind::from_identifier(&self.identifier())
    }
}
