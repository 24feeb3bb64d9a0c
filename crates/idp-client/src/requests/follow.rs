// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Follow the chain of documents served once the user is authenticated, up to
//! the SAML assertion.
//!
//! Each document is fetched, classified, and either submitted like the
//! browser would, or ends the chain.

use sso_http::redacted_url;

use crate::{
    context::Attempt,
    document::{ClassifiedDocument, Document, extract_state_token},
    error::FollowError,
    types::assertion::Assertion,
};

/// How the chain of documents ended.
#[derive(Debug)]
pub enum FollowOutcome {
    /// The SAML assertion was found.
    Assertion(Assertion),

    /// The identity provider wants the login flow to start over with this
    /// state token.
    Restart {
        /// The state token scraped from the login page.
        state_token: String,
    },
}

/// Send `request` and follow the documents it leads to.
///
/// At most [`FlowContext::max_hops`](crate::FlowContext::max_hops) documents
/// are fetched.
#[tracing::instrument(skip_all, fields(max_hops = attempt.context.max_hops()))]
pub(crate) async fn follow(
    attempt: &Attempt<'_>,
    request: reqwest::RequestBuilder,
) -> Result<FollowOutcome, FollowError> {
    let context = attempt.context;
    let mut request = request;

    for hop in 1..=context.max_hops() {
        let fetched = attempt.fetch::<FollowError>(request).await?;
        let document = Document::new(fetched.url, fetched.body);

        let kind = document.classify(context.consumer_url());
        tracing::debug!(
            hop,
            url = %redacted_url(document.url()),
            "Got {kind}",
        );

        match kind {
            ClassifiedDocument::AssertionRedirectForm {
                saml_response: Some(saml_response),
            } => {
                let assertion = Assertion::from_encoded(&saml_response)?;
                return Ok(FollowOutcome::Assertion(assertion));
            }

            ClassifiedDocument::AssertionRedirectForm {
                saml_response: None,
            } => {
                let state_token = fetch_state_token(attempt).await?;
                return Ok(FollowOutcome::Restart { state_token });
            }

            ClassifiedDocument::SamlRequestForm
            | ClassifiedDocument::ResumeForm
            | ClassifiedDocument::SamlResponseForm => {
                let form = document.form()?;
                tracing::debug!(
                    method = %form.method,
                    action = %redacted_url(&form.action),
                    "Submitting form",
                );
                request = form.into_request(attempt.http_client);
            }

            ClassifiedDocument::Unknown => {
                let (url, document) = document.into_parts();
                tracing::debug!(
                    url = %redacted_url(&url),
                    document = document.as_str(),
                    "Could not classify document",
                );
                return Err(FollowError::UnknownDocument { url, document });
            }
        }
    }

    Err(FollowError::TooManyHops {
        max: context.max_hops(),
    })
}

/// Load the login page again, to get the state token it embeds.
async fn fetch_state_token(attempt: &Attempt<'_>) -> Result<String, FollowError> {
    let login_url = attempt.context.login_url().clone();
    let fetched = attempt
        .fetch::<FollowError>(attempt.http_client.get(login_url))
        .await?;

    extract_state_token(&fetched.body).ok_or(FollowError::MissingStateToken)
}
