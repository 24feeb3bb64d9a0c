// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The [Duo web SDK] handshake, for factors provided by Duo.
//!
//! The challenge returned by the identity provider points to a Duo API host.
//! The client then talks to that host like the Duo iframe would:
//!
//! 1. open the authentication frame with the transaction signature, to get a
//!    session ID;
//! 2. start a transaction with the chosen method;
//! 3. poll the transaction status until it succeeds or fails;
//! 4. fetch the result, which holds a signed cookie;
//!
//! and gives the cookie, signed with the application signature, back to the
//! identity provider, which can then issue the session token.
//!
//! [Duo web SDK]: https://duo.com/docs/duoweb-v2

use serde::Deserialize;
use url::Url;

use super::mfa::verify_request;
use crate::{
    context::Attempt,
    document::Document,
    error::DuoError,
    prompt::choose_checked,
    types::{
        authn::{Link, SessionToken, VerifyResponse},
        credentials::DuoMethod,
        factor::Factor,
    },
};

#[derive(Deserialize)]
struct ChallengeResponse {
    #[serde(rename = "_embedded")]
    embedded: ChallengeEmbedded,
}

#[derive(Deserialize)]
struct ChallengeEmbedded {
    factor: ChallengeFactor,
}

#[derive(Deserialize)]
struct ChallengeFactor {
    #[serde(rename = "_embedded")]
    embedded: ChallengeFactorEmbedded,
}

#[derive(Deserialize)]
struct ChallengeFactorEmbedded {
    verification: Verification,
}

#[derive(Deserialize)]
struct Verification {
    host: String,
    signature: String,
    #[serde(rename = "_links")]
    links: VerificationLinks,
}

#[derive(Deserialize)]
struct VerificationLinks {
    complete: Link,
}

/// A Duo challenge, as returned by the identity provider when the Duo factor
/// is challenged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuoChallenge {
    /// The base URL of the Duo API host.
    pub host: Url,

    /// The signature of the transaction, sent to Duo.
    pub tx_signature: String,

    /// The signature of the application, sent back to the identity provider
    /// with the Duo cookie.
    pub app_signature: String,

    /// Where to send the signed Duo cookie.
    pub callback: Url,
}

impl DuoChallenge {
    /// Parse the challenge from the body of a verify response.
    ///
    /// The Duo host is reached with `scheme`, the one of the identity
    /// provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a Duo challenge, if the host is not
    /// valid, or if the signature doesn't have two parts.
    pub fn parse(body: &str, scheme: &str) -> Result<Self, DuoError> {
        let response: ChallengeResponse = serde_json::from_str(body)?;
        let verification = response.embedded.factor.embedded.verification;

        let host = Url::parse(&format!("{scheme}://{}/", verification.host))?;
        if host.host_str().is_none() {
            return Err(DuoError::InvalidHost(url::ParseError::EmptyHost));
        }

        let mut signatures = verification.signature.split(':');
        let (Some(tx_signature), Some(app_signature)) = (signatures.next(), signatures.next())
        else {
            return Err(DuoError::MalformedSignature);
        };
        if tx_signature.is_empty() || app_signature.is_empty() {
            return Err(DuoError::MalformedSignature);
        }

        Ok(Self {
            host,
            tx_signature: tx_signature.to_owned(),
            app_signature: app_signature.to_owned(),
            callback: verification.links.complete.href,
        })
    }
}

/// The envelope of every Duo API response.
#[derive(Debug, Deserialize)]
struct DuoResponse<T> {
    #[serde(default)]
    stat: String,

    message: Option<String>,

    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct PromptResponse {
    #[serde(default)]
    txid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    result: Option<String>,

    #[serde(default)]
    result_url: Option<String>,

    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default)]
    cookie: Option<String>,
}

/// Go through the Duo handshake and get a session token.
///
/// `challenge` is the body of the challenge response of `factor`.
#[tracing::instrument(skip_all, fields(duo.host))]
pub(crate) async fn verify(
    attempt: &Attempt<'_>,
    factor: &Factor,
    verify_url: &Url,
    state_token: &str,
    challenge: &str,
    duo_method: Option<DuoMethod>,
) -> Result<SessionToken, DuoError> {
    let context = attempt.context;
    let http_client = attempt.http_client;

    let challenge = DuoChallenge::parse(challenge, context.idp_base().scheme())?;
    if let Some(host) = challenge.host.host_str() {
        tracing::Span::current().record("duo.host", host);
    }

    // Open the authentication frame
    let parent = context.idp_base().join("signin/verify/duo/web")?;
    let mut auth_url = challenge.host.join("frame/web/v1/auth")?;
    auth_url
        .query_pairs_mut()
        .append_pair("tx", &challenge.tx_signature);

    let frame = attempt
        .fetch::<DuoError>(http_client.post(auth_url).form(&[
            ("parent", parent.as_str()),
            ("java_version", ""),
            ("java_version", ""),
            ("flash_version", ""),
            ("screen_resolution_width", "3008"),
            ("screen_resolution_height", "1692"),
            ("color_depth", "24"),
        ]))
        .await?;

    let sid = Document::new(frame.url, frame.body)
        .input_value("sid")
        .ok_or(DuoError::MissingSid)?;

    // Start the transaction
    let method = match duo_method {
        Some(method) => method,
        None => {
            let labels = DuoMethod::ALL.map(|method| method.label().to_owned());
            let index = choose_checked(attempt.prompter, "Select a DUO MFA Option", &labels)?;
            DuoMethod::ALL[index]
        }
    };

    let passcode = match method {
        DuoMethod::Passcode => Some(attempt.prompter.required_string("Enter passcode")?),
        DuoMethod::Push => None,
    };

    let mut form = vec![
        ("sid", sid.as_str()),
        ("device", "phone1"),
        ("factor", method.label()),
        ("out_of_date", "false"),
    ];
    if let Some(passcode) = &passcode {
        form.push(("passcode", passcode.as_str()));
    }

    let prompt_url = challenge.host.join("frame/prompt")?;
    let prompt: DuoResponse<PromptResponse> = attempt
        .fetch_json::<_, DuoError>(http_client.post(prompt_url).form(&form))
        .await?;

    if prompt.stat != "OK" {
        return Err(DuoError::PromptRejected {
            stat: prompt.stat,
            message: prompt.message,
        });
    }

    let txid = prompt
        .response
        .and_then(|response| response.txid)
        .ok_or(DuoError::MissingTxid)?;
    tracing::debug!(%method, "Duo transaction started");

    // Wait for the transaction to complete
    let transaction = [("sid", sid.as_str()), ("txid", txid.as_str())];
    let status_url = challenge.host.join("frame/status")?;

    let result_url = loop {
        let status: DuoResponse<StatusResponse> = attempt
            .fetch_json::<_, DuoError>(http_client.post(status_url.clone()).form(&transaction))
            .await?;
        let status = status.response.unwrap_or_default();

        if let Some(message) = &status.status {
            tracing::info!(message = %message, "Duo transaction status");
        }

        match status.result.as_deref() {
            Some("SUCCESS") => break status.result_url.ok_or(DuoError::MissingResultUrl)?,
            Some("FAILURE") => {
                return Err(DuoError::Failure {
                    status: status.status,
                });
            }
            _ => {}
        }

        attempt.sleep(context.duo_status_interval()).await?;
    };

    // Get the signed cookie
    let result: DuoResponse<ResultResponse> = attempt
        .fetch_json::<_, DuoError>(
            http_client
                .post(challenge.host.join(&result_url)?)
                .form(&transaction),
        )
        .await?;

    let cookie = result
        .response
        .and_then(|response| response.cookie)
        .ok_or(DuoError::MissingCookie)?;

    // Hand it back to the identity provider
    let sig_response = format!("{cookie}:{}", challenge.app_signature);
    attempt
        .fetch::<DuoError>(http_client.post(challenge.callback.clone()).form(&[
            ("id", factor.id.as_str()),
            ("stateToken", state_token),
            ("sig_response", sig_response.as_str()),
        ]))
        .await?;

    let request =
        verify_request(attempt, verify_url, state_token, None).header("X-Okta-XsrfToken", "");
    let response: VerifyResponse = attempt.fetch_json::<_, DuoError>(request).await?;

    response.session_token.ok_or(DuoError::MissingSessionToken)
}
