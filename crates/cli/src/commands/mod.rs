// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use sso_config::{ConfigurationSection, RootConfig};

mod config;
mod login;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Log in and print the SAML assertion on standard output
    Login(self::login::Options),

    /// Configuration-related commands
    Config(self::config::Options),
}

#[derive(Parser, Debug)]
#[command(version = crate::VERSION)]
pub struct Options {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Append,
    )]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            Some(S::Login(c)) => Box::pin(c.run(figment)).await,
            Some(S::Config(c)) => Box::pin(c.run(figment)).await,
            None => Box::pin(self::login::Options::default().run(figment)).await,
        }
    }

    /// Get a [`Figment`] instance with the configuration loaded
    pub fn figment(&self) -> Figment {
        let configs = if self.config.is_empty() {
            // Read the SSO_LOGIN_CONFIG environment variable
            std::env::var("SSO_LOGIN_CONFIG")
                // Default to "sso-login.yaml"
                .unwrap_or_else(|_| "sso-login.yaml".to_owned())
                // Split the file list on `:`
                .split(':')
                .map(Utf8PathBuf::from)
                .collect()
        } else {
            self.config.clone()
        };
        // Environment variables override the files
        configs
            .iter()
            .fold(Figment::new(), |f, path| f.admerge(Yaml::file(path)))
            .merge(
                Env::prefixed("SSO_LOGIN_")
                    .split("__")
                    .ignore(&["config", "password"]),
            )
    }
}

/// Load and validate the whole configuration
fn load_config(figment: &Figment) -> anyhow::Result<RootConfig> {
    RootConfig::extract(figment)
        .map_err(anyhow::Error::from_boxed)
        .context("Failed to load the configuration")
}
