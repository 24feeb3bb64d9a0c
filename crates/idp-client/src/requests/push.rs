// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Wait for the user to approve a push notification.

use url::Url;

use super::mfa::verify_request;
use crate::{
    context::Attempt,
    error::PushError,
    types::authn::{AuthnStatus, SessionToken, VerifyResponse},
};

/// Poll the verify endpoint of a push factor until the notification is
/// approved, rejected or expired.
///
/// The identity provider reports progress in the `factorResult` field, which
/// stays `WAITING` until the user answers.
#[tracing::instrument(skip_all)]
pub(crate) async fn wait_for_approval(
    attempt: &Attempt<'_>,
    verify_url: &Url,
    state_token: &str,
) -> Result<SessionToken, PushError> {
    tracing::info!("Waiting for approval, please check your device");

    let mut polls = 0_u32;
    loop {
        polls += 1;
        let request = verify_request(attempt, verify_url, state_token, None);
        let response: VerifyResponse = attempt.fetch_json::<_, PushError>(request).await?;

        if response.status == Some(AuthnStatus::Success) {
            tracing::info!(polls, "Push notification approved");
            return response.session_token.ok_or(PushError::MissingSessionToken);
        }

        match response.factor_result.as_deref() {
            Some("WAITING") => tracing::debug!(polls, "Still waiting for approval"),
            Some("TIMEOUT") => return Err(PushError::Timeout),
            Some("REJECTED") => return Err(PushError::Rejected),
            _ => {
                return Err(PushError::UnrecognizedResponse {
                    factor_result: response.factor_result.clone(),
                });
            }
        }

        attempt.sleep(attempt.context.push_interval()).await?;
    }
}
