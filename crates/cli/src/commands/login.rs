// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use figment::{Figment, providers::Serialized};
use sso_config::{AccountConfig, DuoMfaOption, HttpConfig, PollingConfig};
use sso_http::ClientOptions;
use sso_idp_client::{Credentials, DuoMethod, FlowContext, MfaPreference, authenticate};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use url::Url;

use crate::prompt::TerminalPrompter;

/// Environment variable holding the password, to avoid prompting for it
const PASSWORD_ENV: &str = "SSO_LOGIN_PASSWORD";

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DuoOption {
    /// Send a push notification to the enrolled device
    Push,

    /// Type a passcode
    Passcode,
}

impl From<DuoOption> for DuoMfaOption {
    fn from(value: DuoOption) -> Self {
        match value {
            DuoOption::Push => Self::Push,
            DuoOption::Passcode => Self::Passcode,
        }
    }
}

#[derive(Parser, Debug, Default)]
pub(super) struct Options {
    /// URL of the application in the identity provider
    #[arg(long)]
    url: Option<Url>,

    /// Username to log in with
    #[arg(short, long)]
    username: Option<String>,

    /// Preferred second factor, either `Auto` or the beginning of a factor
    /// label like `SMS`
    #[arg(long)]
    mfa: Option<String>,

    /// Duo method to use without prompting
    #[arg(long, value_enum)]
    duo_mfa_option: Option<DuoOption>,

    /// Do not verify TLS certificates
    #[arg(long)]
    skip_verify: bool,

    /// Print the XML document instead of its base64 encoding
    #[arg(long)]
    decode: bool,
}

impl Options {
    /// Layer the command line flags on top of the loaded configuration
    fn figment(&self, figment: &Figment) -> Figment {
        let mut figment = figment.clone();

        if let Some(url) = &self.url {
            figment = figment.merge(Serialized::default("account.url", url.as_str()));
        }

        if let Some(username) = &self.username {
            figment = figment.merge(Serialized::default("account.username", username));
        }

        if let Some(mfa) = &self.mfa {
            figment = figment.merge(Serialized::default("account.mfa", mfa));
        }

        if let Some(option) = self.duo_mfa_option {
            figment = figment.merge(Serialized::default(
                "account.duo_mfa_option",
                DuoMfaOption::from(option),
            ));
        }

        if self.skip_verify {
            figment = figment.merge(Serialized::default("http.skip_verify", true));
        }

        figment
    }

    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let figment = self.figment(figment);
        let config = super::load_config(&figment)?;

        let http_client = sso_http::reqwest_client(&client_options(&config.http))
            .context("Failed to create the HTTP client")?;

        let cancellation = CancellationToken::new();
        let context = flow_context(&config.account, &config.polling)?
            .with_cancellation_token(cancellation.clone());

        let prompter = TerminalPrompter::new();
        let credentials = credentials(&config.account, &prompter)?;

        // Ctrl-C stops whatever the flow is waiting on
        tokio::spawn({
            let cancellation = cancellation.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling the login");
                    cancellation.cancel();
                }
            }
        });

        let span = info_span!(
            "cli.login",
            account.url = %sso_http::redacted_url(context.login_url()),
            account.username = credentials.username(),
        );
        let assertion = authenticate(&http_client, &context, &prompter, credentials)
            .instrument(span)
            .await
            .context("Login failed")?;

        info!("Login succeeded");

        let output = if self.decode {
            assertion.xml().into_owned()
        } else {
            assertion.as_base64().to_owned()
        };

        let mut stdout = tokio::io::stdout();
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        Ok(ExitCode::SUCCESS)
    }
}

fn client_options(config: &HttpConfig) -> ClientOptions {
    ClientOptions {
        timeout: config.timeout,
        connect_timeout: config.connect_timeout,
        skip_verify: config.skip_verify,
    }
}

fn flow_context(account: &AccountConfig, polling: &PollingConfig) -> anyhow::Result<FlowContext> {
    let context = FlowContext::new(account.url.clone())
        .context("Invalid login URL")?
        .with_consumer_url(account.consumer_url.clone())
        .with_mfa_preference(MfaPreference::from(account.mfa.as_str()))
        .with_poll_intervals(polling.push_interval, polling.duo_status_interval)
        .with_timeout(polling.timeout)
        .with_limits(polling.max_hops, polling.max_reentries);

    Ok(context)
}

fn credentials(account: &AccountConfig, prompter: &TerminalPrompter) -> anyhow::Result<Credentials> {
    let password = std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty());

    if (account.username.is_none() || password.is_none()) && !TerminalPrompter::is_interactive() {
        anyhow::bail!(
            "No terminal to prompt for credentials, set `account.username` and {PASSWORD_ENV}"
        );
    }

    let username = match &account.username {
        Some(username) => username.clone(),
        None => prompter.username().context("Failed to read the username")?,
    };

    let password = match password {
        Some(password) => password,
        None => prompter.password().context("Failed to read the password")?,
    };

    let credentials = Credentials::new(username, password);
    Ok(match account.duo_mfa_option {
        Some(DuoMfaOption::Push) => credentials.with_duo_method(DuoMethod::Push),
        Some(DuoMfaOption::Passcode) => credentials.with_duo_method(DuoMethod::Passcode),
        None => credentials,
    })
}
