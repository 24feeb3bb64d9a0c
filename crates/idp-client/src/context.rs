// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use serde::de::DeserializeOwned;
use sso_http::RequestBuilderExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{error::FlowContextError, error::Interrupted, prompt::Prompter};

/// The relying party form action which receives the SAML assertion, when not
/// configured otherwise.
pub const DEFAULT_CONSUMER_URL: &str = "https://signin.aws.amazon.com/saml";

/// Roughly 30 years, used in place of durations which overflow an [`Instant`]
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn instant_after(duration: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(duration).unwrap_or(now + FAR_FUTURE)
}

/// Which second factor to use when several are enrolled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MfaPreference {
    /// Ask the user when there is more than one factor.
    #[default]
    Auto,

    /// Use the first factor whose label starts with this prefix.
    Prefix(String),
}

impl From<&str> for MfaPreference {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Prefix(value.to_owned())
        }
    }
}

/// Settings of a login flow, shared by every step of an attempt.
#[derive(Debug, Clone)]
pub struct FlowContext {
    login_url: Url,
    idp_base: Url,
    authn_endpoint: Url,
    session_redirect_endpoint: Url,
    consumer_url: Url,
    mfa_preference: MfaPreference,
    push_interval: Duration,
    duo_status_interval: Duration,
    timeout: Duration,
    max_hops: u32,
    max_reentries: u32,
    cancellation: CancellationToken,
}

impl FlowContext {
    /// Settings for logging in to the application at `login_url`.
    ///
    /// The identity provider API is expected on the same origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL.
    pub fn new(login_url: Url) -> Result<Self, FlowContextError> {
        if !matches!(login_url.scheme(), "http" | "https") || login_url.host_str().is_none() {
            return Err(FlowContextError::InvalidLoginUrl(login_url));
        }

        let idp_base = login_url.join("/")?;
        let authn_endpoint = idp_base.join("api/v1/authn")?;
        let session_redirect_endpoint = idp_base.join("login/sessionCookieRedirect")?;
        let consumer_url = Url::parse(DEFAULT_CONSUMER_URL)?;

        Ok(Self {
            login_url,
            idp_base,
            authn_endpoint,
            session_redirect_endpoint,
            consumer_url,
            mfa_preference: MfaPreference::Auto,
            push_interval: Duration::from_secs(1),
            duo_status_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(5 * 60),
            max_hops: 16,
            max_reentries: 3,
            cancellation: CancellationToken::new(),
        })
    }

    /// Set the form action which receives the SAML assertion.
    #[must_use]
    pub fn with_consumer_url(mut self, consumer_url: Url) -> Self {
        self.consumer_url = consumer_url;
        self
    }

    /// Set which factor to use.
    #[must_use]
    pub fn with_mfa_preference(mut self, mfa_preference: MfaPreference) -> Self {
        self.mfa_preference = mfa_preference;
        self
    }

    /// Set the delays between two checks of a push approval and of a Duo
    /// transaction.
    #[must_use]
    pub fn with_poll_intervals(mut self, push: Duration, duo_status: Duration) -> Self {
        self.push_interval = push;
        self.duo_status_interval = duo_status;
        self
    }

    /// Set the maximum duration of a whole attempt.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many documents can be followed, and how many times the flow
    /// can restart with a state token.
    #[must_use]
    pub fn with_limits(mut self, max_hops: u32, max_reentries: u32) -> Self {
        self.max_hops = max_hops;
        self.max_reentries = max_reentries;
        self
    }

    /// Use this token to cancel the attempts made with this context.
    #[must_use]
    pub fn with_cancellation_token(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// The URL of the application in the identity provider.
    #[must_use]
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// The origin of the identity provider.
    #[must_use]
    pub fn idp_base(&self) -> &Url {
        &self.idp_base
    }

    /// The primary authentication endpoint of the identity provider.
    #[must_use]
    pub fn authn_endpoint(&self) -> &Url {
        &self.authn_endpoint
    }

    /// The endpoint exchanging a session token for a browser session.
    #[must_use]
    pub fn session_redirect_endpoint(&self) -> &Url {
        &self.session_redirect_endpoint
    }

    /// The form action which receives the SAML assertion.
    #[must_use]
    pub fn consumer_url(&self) -> &Url {
        &self.consumer_url
    }

    /// Which factor to use.
    #[must_use]
    pub fn mfa_preference(&self) -> &MfaPreference {
        &self.mfa_preference
    }

    /// The delay between two checks of a push approval.
    #[must_use]
    pub fn push_interval(&self) -> Duration {
        self.push_interval
    }

    /// The delay between two checks of a Duo transaction.
    #[must_use]
    pub fn duo_status_interval(&self) -> Duration {
        self.duo_status_interval
    }

    /// How many documents can be followed.
    #[must_use]
    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    /// How many times the flow can restart with a state token.
    #[must_use]
    pub fn max_reentries(&self) -> u32 {
        self.max_reentries
    }

    /// The token cancelling the attempts.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// A response body, with the URL it was served from after redirections.
#[derive(Debug)]
pub(crate) struct Fetched {
    pub url: Url,
    pub body: String,
}

/// Everything a step of one login attempt needs.
pub(crate) struct Attempt<'a> {
    pub http_client: &'a reqwest::Client,
    pub context: &'a FlowContext,
    pub prompter: &'a dyn Prompter,
    deadline: Instant,
}

impl<'a> Attempt<'a> {
    pub fn new(
        http_client: &'a reqwest::Client,
        context: &'a FlowContext,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            http_client,
            context,
            prompter,
            deadline: instant_after(context.timeout),
        }
    }

    pub fn check(&self) -> Result<(), Interrupted> {
        if self.context.cancellation.is_cancelled() {
            Err(Interrupted::Cancelled)
        } else if Instant::now() >= self.deadline {
            Err(Interrupted::DeadlineExceeded)
        } else {
            Ok(())
        }
    }

    /// Wait between two polls, stopping early on cancellation or when the
    /// deadline is reached.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let wake_up = instant_after(duration);

        tokio::select! {
            biased;

            () = self.context.cancellation.cancelled() => Err(Interrupted::Cancelled),
            () = tokio::time::sleep_until(wake_up.min(self.deadline)) => {
                if wake_up > self.deadline {
                    Err(Interrupted::DeadlineExceeded)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Send a request and read its body, failing on non-success statuses and
    /// when the attempt is interrupted.
    pub async fn fetch<E>(&self, request: reqwest::RequestBuilder) -> Result<Fetched, E>
    where
        E: From<reqwest::Error> + From<Interrupted>,
    {
        self.check()?;

        let exchange = async {
            let response = request.send_checked().await?;
            let url = response.url().clone();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(Fetched { url, body })
        };

        tokio::select! {
            biased;

            () = self.context.cancellation.cancelled() => Err(Interrupted::Cancelled.into()),
            result = tokio::time::timeout_at(self.deadline, exchange) => match result {
                Ok(fetched) => Ok(fetched?),
                Err(_elapsed) => Err(Interrupted::DeadlineExceeded.into()),
            },
        }
    }

    /// Like [`Self::fetch`], decoding the body as JSON.
    pub async fn fetch_json<T, E>(&self, request: reqwest::RequestBuilder) -> Result<T, E>
    where
        T: DeserializeOwned,
        E: From<reqwest::Error> + From<Interrupted> + From<serde_json::Error>,
    {
        let fetched: Fetched = self.fetch::<E>(request).await?;
        Ok(serde_json::from_str(&fetched.body)?)
    }
}
