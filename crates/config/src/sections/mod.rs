// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod account;
mod http;
mod polling;
mod telemetry;

pub use self::{
    account::{AccountConfig, DuoMfaOption},
    http::HttpConfig,
    polling::PollingConfig,
    telemetry::{LogFormat, TelemetryConfig},
};
use crate::{ConfigError, util::ConfigurationSection};

/// Application configuration root
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// The account to log in with
    pub account: AccountConfig,

    /// Configuration of the HTTP client
    #[serde(default)]
    pub http: HttpConfig,

    /// Configuration of the waiting loops and bounds of the login flow
    #[serde(default)]
    pub polling: PollingConfig,

    /// Configuration related to logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), ConfigError> {
        self.account.validate(figment)?;
        self.http.validate(figment)?;
        self.polling.validate(figment)?;
        self.telemetry.validate(figment)?;

        Ok(())
    }
}

/// Generate the JSON schema of the configuration file
#[must_use]
pub fn schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(RootConfig)
}
