// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};
use url::Url;

use crate::{ConfigError, ConfigurationSection};

fn default_mfa() -> String {
    "Auto".to_owned()
}

fn is_default_mfa(value: &str) -> bool {
    value == "Auto"
}

fn default_consumer_url() -> Url {
    Url::parse("https://signin.aws.amazon.com/saml").unwrap()
}

fn is_default_consumer_url(value: &Url) -> bool {
    *value == default_consumer_url()
}

fn login_url_example() -> &'static str {
    "https://example.okta.com/home/amazon_aws/0oa1b2c3d4e5f6g7h8i9/272"
}

/// Method used with the Duo second factor, when known in advance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum DuoMfaOption {
    /// Send a push notification to the enrolled device
    #[serde(rename = "Duo Push", alias = "push")]
    Push,

    /// Type a passcode generated by the Duo app or a hardware token
    #[serde(rename = "Passcode", alias = "passcode")]
    Passcode,
}

/// Configuration of the account to log in with
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AccountConfig {
    /// URL of the application in the identity provider. The identity provider
    /// API is reached on the same host.
    #[schemars(url, example = "login_url_example")]
    pub url: Url,

    /// Username to log in with. Prompted for when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Preferred second factor. Either `Auto` to choose interactively, or the
    /// beginning of a factor label, like `SMS` or `DUO`.
    #[serde(default = "default_mfa", skip_serializing_if = "is_default_mfa")]
    pub mfa: String,

    /// Duo method to use without prompting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duo_mfa_option: Option<DuoMfaOption>,

    /// Form action of the relying party which consumes the SAML assertion
    #[schemars(url)]
    #[serde(
        default = "default_consumer_url",
        skip_serializing_if = "is_default_consumer_url"
    )]
    pub consumer_url: Url,
}

impl ConfigurationSection for AccountConfig {
    const PATH: Option<&'static str> = Some("account");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if !matches!(self.url.scheme(), "http" | "https") || self.url.host_str().is_none() {
            return Err(
                figment::error::Error::custom("login URL must be an http(s) URL with a host")
                    .with_path("url")
                    .into(),
            );
        }

        if self.mfa.trim().is_empty() {
            return Err(figment::error::Error::custom("MFA preference can't be empty")
                .with_path("mfa")
                .into());
        }

        Ok(())
    }
}
