// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Requests for the primary authentication, and the whole login flow.

use reqwest::header::ACCEPT;
use sso_http::redacted_url;

use super::{
    follow::{FollowOutcome, follow},
    mfa,
};
use crate::{
    FlowContext, Prompter,
    context::Attempt,
    error::AuthenticationError,
    types::{
        assertion::Assertion,
        authn::{AuthnRequest, AuthnResponse, AuthnStatus, SessionToken},
        credentials::Credentials,
    },
};

/// Log in and get the SAML assertion of the application.
///
/// The flow goes through the primary authentication, a second factor if the
/// identity provider asks for one, and the chain of documents leading to the
/// assertion. If the identity provider wants the flow to start over, it is
/// restarted with the state token it gave, up to
/// [`FlowContext::max_reentries`] times.
///
/// # Arguments
///
/// * `http_client` - The client to use for all requests. It must keep
///   cookies, since the browser session lives in them.
///
/// * `context` - The settings of the flow.
///
/// * `prompter` - What to ask the user with, when a choice or a passcode is
///   needed.
///
/// * `credentials` - What the user logs in with.
///
/// # Errors
///
/// Returns an error if any step fails, if the flow restarts too many times, or
/// if the deadline is reached or the cancellation token is triggered.
#[tracing::instrument(
    skip_all,
    fields(
        login_url = %redacted_url(context.login_url()),
        username = credentials.username(),
    ),
)]
pub async fn authenticate(
    http_client: &reqwest::Client,
    context: &FlowContext,
    prompter: &dyn Prompter,
    credentials: Credentials,
) -> Result<Assertion, AuthenticationError> {
    let attempt = Attempt::new(http_client, context, prompter);
    let mut credentials = credentials;
    let mut reentries = 0;

    loop {
        let session_token = primary_authentication(&attempt, &credentials).await?;

        let mut redirect = context.session_redirect_endpoint().clone();
        redirect
            .query_pairs_mut()
            .append_pair("checkAccountSetupComplete", "true")
            .append_pair("token", session_token.as_str())
            .append_pair("redirectUrl", context.login_url().as_str());

        match follow(&attempt, http_client.get(redirect)).await? {
            FollowOutcome::Assertion(assertion) => return Ok(assertion),
            FollowOutcome::Restart { state_token } => {
                if reentries >= context.max_reentries() {
                    return Err(AuthenticationError::TooManyReentries {
                        max: context.max_reentries(),
                    });
                }

                reentries += 1;
                tracing::info!(reentries, "Login flow restarted, authenticating again");
                credentials = credentials.with_state_token(state_token);
            }
        }
    }
}

/// Authenticate with the password, or with the state token when restarting,
/// then go through the second factor if needed.
async fn primary_authentication(
    attempt: &Attempt<'_>,
    credentials: &Credentials,
) -> Result<SessionToken, AuthenticationError> {
    let body = match credentials.state_token() {
        Some(state_token) => AuthnRequest::StateToken { state_token },
        None => AuthnRequest::Password {
            username: credentials.username(),
            password: credentials.password(),
        },
    };

    let request = attempt
        .http_client
        .post(attempt.context.authn_endpoint().clone())
        .header(ACCEPT, "application/json")
        .json(&body);

    let response: AuthnResponse = attempt
        .fetch_json::<_, AuthenticationError>(request)
        .await?;
    tracing::debug!(status = %response.status, "Got primary authentication response");

    match response.status {
        AuthnStatus::Success => response
            .session_token
            .ok_or(AuthenticationError::MissingSessionToken),

        AuthnStatus::MfaRequired => {
            let state_token = response
                .state_token
                .as_deref()
                .ok_or(AuthenticationError::MissingStateToken)?;

            let session_token = mfa::verify(
                attempt,
                state_token,
                &response.embedded.factors,
                credentials.duo_method(),
            )
            .await?;

            Ok(session_token)
        }

        AuthnStatus::Other(status) => Err(AuthenticationError::UnexpectedStatus { status }),
    }
}
