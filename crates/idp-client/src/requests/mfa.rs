// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Verification of the second factor.

use reqwest::header::ACCEPT;
use url::Url;

use super::{duo, push};
use crate::{
    context::{Attempt, MfaPreference},
    error::MfaError,
    prompt::{PromptError, Prompter, choose_checked},
    types::{
        authn::{SessionToken, VerifyRequest, VerifyResponse},
        credentials::DuoMethod,
        factor::{Factor, FactorKind},
    },
};

/// How a supported factor is verified.
enum Strategy {
    Passcode,
    Push,
    Duo,
}

/// Pick the factor to verify among the enrolled ones, returning its index.
///
/// With a [`MfaPreference::Prefix`], the first factor whose label starts with
/// the prefix is picked. Otherwise, or if no label matches, the user chooses
/// when there is more than one factor.
///
/// # Errors
///
/// Returns an error if prompting the user fails.
pub fn select_factor(
    factors: &[Factor],
    preference: &MfaPreference,
    prompter: &dyn Prompter,
) -> Result<usize, PromptError> {
    let labels: Vec<String> = factors.iter().map(|factor| factor.kind().label()).collect();

    if let MfaPreference::Prefix(prefix) = preference {
        if let Some(index) = labels
            .iter()
            .position(|label| label.starts_with(prefix.as_str()))
        {
            return Ok(index);
        }

        tracing::warn!(%prefix, "No enrolled factor matches the preferred MFA option");
    }

    if labels.len() == 1 {
        return Ok(0);
    }

    choose_checked(prompter, "Select which MFA option to use", &labels)
}

/// Verify one of the `factors` and get a session token.
#[tracing::instrument(skip_all, fields(factor))]
pub(crate) async fn verify(
    attempt: &Attempt<'_>,
    state_token: &str,
    factors: &[Factor],
    duo_method: Option<DuoMethod>,
) -> Result<SessionToken, MfaError> {
    if factors.is_empty() {
        return Err(MfaError::NoFactors);
    }

    let index = select_factor(factors, attempt.context.mfa_preference(), attempt.prompter)?;
    let factor = &factors[index];
    let kind = factor.kind();
    tracing::Span::current().record("factor", kind.identifier());

    let strategy = match kind {
        FactorKind::Sms
        | FactorKind::GoogleTotp
        | FactorKind::OktaTotp
        | FactorKind::SymantecToken => Strategy::Passcode,
        FactorKind::Push => Strategy::Push,
        FactorKind::Duo => Strategy::Duo,
        FactorKind::Unsupported(identifier) => {
            return Err(MfaError::UnsupportedFactor { identifier });
        }
    };

    let verify_url = factor
        .links
        .verify
        .as_ref()
        .map(|link| link.href.clone())
        .ok_or_else(|| MfaError::MissingVerifyLink {
            id: factor.id.clone(),
        })?;

    tracing::debug!(factor_id = %factor.id, "Sending challenge");
    let challenge = attempt
        .fetch::<MfaError>(verify_request(attempt, &verify_url, state_token, None))
        .await?;

    let session_token = match strategy {
        Strategy::Passcode => {
            let passcode = attempt.prompter.required_string("Enter verification code")?;
            let request = verify_request(attempt, &verify_url, state_token, Some(&passcode));
            let response: VerifyResponse = attempt.fetch_json::<_, MfaError>(request).await?;
            response.session_token.ok_or(MfaError::MissingSessionToken)?
        }

        Strategy::Push => push::wait_for_approval(attempt, &verify_url, state_token).await?,

        Strategy::Duo => {
            duo::verify(
                attempt,
                factor,
                &verify_url,
                state_token,
                &challenge.body,
                duo_method,
            )
            .await?
        }
    };

    Ok(session_token)
}

/// A JSON request to the verify endpoint of a factor.
pub(crate) fn verify_request(
    attempt: &Attempt<'_>,
    verify_url: &Url,
    state_token: &str,
    pass_code: Option<&str>,
) -> reqwest::RequestBuilder {
    attempt
        .http_client
        .post(verify_url.clone())
        .header(ACCEPT, "application/json")
        .json(&VerifyRequest {
            state_token,
            pass_code,
        })
}
