// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::{Value, json};
use sso_idp_client::{
    AuthenticationError, FlowContext, authenticate,
    error::{Interrupted, MfaError, PushError},
};
use wiremock::{
    Mock, MockServer,
    matchers::{body_json, method, path},
};

use crate::{
    SESSION_TOKEN, STATE_TOKEN, ScriptedPrompter, Sequence, assertion_page, credentials,
    encoded_assertion, factor, init_test, mfa_required, mount_authn, mount_session_redirect,
    received_paths,
};

const VERIFY_PATH: &str = "/api/v1/authn/factors/opf1/verify";

fn waiting() -> Value {
    json!({
        "stateToken": STATE_TOKEN,
        "status": "MFA_CHALLENGE",
        "factorResult": "WAITING",
    })
}

fn result(factor_result: &str) -> Value {
    json!({
        "stateToken": STATE_TOKEN,
        "status": "MFA_CHALLENGE",
        "factorResult": factor_result,
    })
}

fn success() -> Value {
    json!({
        "status": "SUCCESS",
        "sessionToken": SESSION_TOKEN,
    })
}

/// The challenge, then each of the `polls`.
async fn mount_push(server: &MockServer, polls: Vec<Value>) {
    mount_authn(
        server,
        mfa_required(vec![factor(server, "opf1", "OKTA", "push")]),
    )
    .await;

    let mut responses = vec![waiting()];
    responses.extend(polls);

    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .and(body_json(json!({"stateToken": STATE_TOKEN})))
        .respond_with(Sequence::json(responses))
        .mount(server)
        .await;
}

async fn login(
    http_client: &reqwest::Client,
    context: &FlowContext,
) -> Result<(), AuthenticationError> {
    authenticate(
        http_client,
        context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .map(|_| ())
}

async fn verify_requests(server: &MockServer) -> usize {
    received_paths(server)
        .await
        .into_iter()
        .filter(|path| path == VERIFY_PATH)
        .count()
}

#[tokio::test]
async fn pass_after_two_waits() {
    let (http_client, mock_server, context) = init_test().await;

    mount_push(&mock_server, vec![waiting(), waiting(), success()]).await;
    mount_session_redirect(
        &mock_server,
        SESSION_TOKEN,
        assertion_page(Some(&encoded_assertion())),
    )
    .await;

    login(&http_client, &context).await.unwrap();

    // The challenge and three polls
    assert_eq!(verify_requests(&mock_server).await, 4);
}

#[tokio::test]
async fn fail_timeout() {
    let (http_client, mock_server, context) = init_test().await;

    mount_push(&mock_server, vec![waiting(), result("TIMEOUT")]).await;

    let error = login(&http_client, &context).await.unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Push(PushError::Timeout))
    );
    assert_eq!(verify_requests(&mock_server).await, 3);
}

#[tokio::test]
async fn fail_rejected() {
    let (http_client, mock_server, context) = init_test().await;

    mount_push(&mock_server, vec![result("REJECTED")]).await;

    let error = login(&http_client, &context).await.unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Push(PushError::Rejected))
    );
}

#[tokio::test]
async fn fail_unrecognized_result() {
    let (http_client, mock_server, context) = init_test().await;

    mount_push(&mock_server, vec![result("CANCELLED")]).await;

    let error = login(&http_client, &context).await.unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Push(PushError::UnrecognizedResponse {
            factor_result: Some(result)
        })) if result == "CANCELLED"
    );
}

#[tokio::test]
async fn fail_deadline_exceeded() {
    let (http_client, mock_server, context) = init_test().await;
    let context = context
        .with_poll_intervals(Duration::from_millis(50), Duration::from_millis(50))
        .with_timeout(Duration::from_millis(300));

    // Never answered
    mount_push(&mock_server, vec![waiting()]).await;

    let error = login(&http_client, &context).await.unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Push(PushError::Interrupted(
            Interrupted::DeadlineExceeded
        )))
    );
}

#[tokio::test]
async fn fail_cancelled_while_waiting() {
    let (http_client, mock_server, context) = init_test().await;
    let context = context.with_poll_intervals(Duration::from_secs(60), Duration::from_secs(60));

    mount_push(&mock_server, vec![waiting()]).await;

    let token = context.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        token.cancel();
    });

    let error = login(&http_client, &context).await.unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Push(PushError::Interrupted(
            Interrupted::Cancelled
        )))
    );
    // The challenge and the first poll
    assert_eq!(verify_requests(&mock_server).await, 2);
}
