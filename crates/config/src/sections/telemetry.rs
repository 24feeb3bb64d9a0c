// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigurationSection;

fn default_log_filter() -> String {
    "info".to_owned()
}

fn log_filter_example() -> &'static str {
    "info,sso_idp_client=debug"
}

/// Output format of the logs written to stderr
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one line per event
    #[default]
    Compact,

    /// Multi-line, with the source location of each event
    Pretty,
}

/// Configuration related to logging
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct TelemetryConfig {
    /// Log filter directives used when `RUST_LOG` is not set
    #[schemars(example = "log_filter_example")]
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Format of the log lines
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_format: LogFormat::default(),
        }
    }
}

impl ConfigurationSection for TelemetryConfig {
    const PATH: Option<&'static str> = Some("telemetry");
}
