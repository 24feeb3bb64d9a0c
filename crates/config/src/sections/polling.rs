// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};
use serde_with::serde_as;

use crate::{ConfigError, ConfigurationSection};

fn default_push_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_duo_status_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

const fn default_max_hops() -> u32 {
    16
}

const fn default_max_reentries() -> u32 {
    3
}

/// Configuration of the waiting loops of the login flow
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PollingConfig {
    /// Delay between two checks of a push notification approval, in
    /// milliseconds. Defaults to 1 second.
    #[schemars(with = "u64", range(min = 1))]
    #[serde(default = "default_push_interval")]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub push_interval: Duration,

    /// Delay between two checks of the Duo transaction status, in
    /// milliseconds. Defaults to 3 seconds.
    #[schemars(with = "u64", range(min = 1))]
    #[serde(default = "default_duo_status_interval")]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub duo_status_interval: Duration,

    /// Maximum duration of a whole login attempt, in seconds. Defaults to 5
    /// minutes.
    #[schemars(with = "u64", range(min = 1))]
    #[serde(default = "default_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub timeout: Duration,

    /// Maximum number of documents followed after the session is established
    #[serde(default = "default_max_hops")]
    #[schemars(range(min = 1))]
    pub max_hops: u32,

    /// Maximum number of times the login flow is restarted with a fresh
    /// state token
    #[serde(default = "default_max_reentries")]
    pub max_reentries: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            push_interval: default_push_interval(),
            duo_status_interval: default_duo_status_interval(),
            timeout: default_timeout(),
            max_hops: default_max_hops(),
            max_reentries: default_max_reentries(),
        }
    }
}

impl ConfigurationSection for PollingConfig {
    const PATH: Option<&'static str> = Some("polling");

    fn validate(&self, _figment: &figment::Figment) -> Result<(), ConfigError> {
        if self.push_interval.is_zero() {
            return Err(figment::error::Error::custom("interval must not be zero")
                .with_path("push_interval")
                .into());
        }

        if self.duo_status_interval.is_zero() {
            return Err(figment::error::Error::custom("interval must not be zero")
                .with_path("duo_status_interval")
                .into());
        }

        if self.timeout.is_zero() {
            return Err(figment::error::Error::custom("timeout must not be zero")
                .with_path("timeout")
                .into());
        }

        if self.max_hops == 0 {
            return Err(figment::error::Error::custom("at least one hop is needed")
                .with_path("max_hops")
                .into());
        }

        Ok(())
    }
}
