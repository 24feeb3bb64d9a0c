// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::ConfigurationSection;

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Configuration of the HTTP client
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct HttpConfig {
    /// Timeout of a single request in seconds. Defaults to 60 seconds.
    #[schemars(with = "u64", range(min = 1))]
    #[serde(default = "default_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub timeout: Duration,

    /// Timeout for establishing a connection in seconds. Defaults to 30
    /// seconds.
    #[schemars(with = "u64", range(min = 1))]
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub connect_timeout: Duration,

    /// Skip the verification of TLS certificates. Never enable this outside
    /// of a lab.
    #[serde(default)]
    pub skip_verify: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            skip_verify: false,
        }
    }
}

impl ConfigurationSection for HttpConfig {
    const PATH: Option<&'static str> = Some("http");
}
