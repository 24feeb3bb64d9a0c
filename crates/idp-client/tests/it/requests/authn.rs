// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use assert_matches::assert_matches;
use serde_json::json;
use sso_idp_client::{
    AuthenticationError, authenticate,
    error::{Interrupted, MfaError},
};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

use crate::{
    PASSWORD, SAML_XML, SESSION_TOKEN, STATE_TOKEN, ScriptedPrompter, USERNAME, assertion_page,
    authn_success, credentials, encoded_assertion, init_test, login_page, mfa_required,
    mount_authn, mount_session_redirect, received_paths,
};

#[tokio::test]
async fn pass_password_only() {
    let (http_client, mock_server, context) = init_test().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"username": USERNAME, "password": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(authn_success(SESSION_TOKEN)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/login/sessionCookieRedirect"))
        .and(query_param("checkAccountSetupComplete", "true"))
        .and(query_param("token", SESSION_TOKEN))
        .and(query_param("redirectUrl", context.login_url().as_str()))
        .respond_with(crate::html(assertion_page(Some(&encoded_assertion()))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prompter = ScriptedPrompter::default();
    let assertion = authenticate(&http_client, &context, &prompter, credentials())
        .await
        .unwrap();

    assert_eq!(assertion.as_base64(), encoded_assertion());
    assert_eq!(assertion.xml(), SAML_XML);
    assert!(prompter.prompts().is_empty());
}

#[tokio::test]
async fn pass_restart_with_state_token() {
    let (http_client, mock_server, context) = init_test().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .and(body_json(json!({"username": USERNAME, "password": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(authn_success(SESSION_TOKEN)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The login page escapes the dashes of the state token
    Mock::given(method("GET"))
        .and(path(crate::LOGIN_PATH))
        .respond_with(crate::html(login_page(r"00state\x2Drestart")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .and(body_json(json!({"stateToken": "00state-restart"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(authn_success("20111second")))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_session_redirect(&mock_server, SESSION_TOKEN, assertion_page(None)).await;
    mount_session_redirect(
        &mock_server,
        "20111second",
        assertion_page(Some(&encoded_assertion())),
    )
    .await;

    let assertion = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap();

    assert_eq!(assertion.xml(), SAML_XML);
    assert_eq!(
        received_paths(&mock_server).await,
        vec![
            "/api/v1/authn",
            "/login/sessionCookieRedirect",
            crate::LOGIN_PATH,
            "/api/v1/authn",
            "/login/sessionCookieRedirect",
        ]
    );
}

#[tokio::test]
async fn fail_too_many_reentries() {
    let (http_client, mock_server, context) = init_test().await;
    let context = context.with_limits(16, 1);

    mount_authn(&mock_server, authn_success(SESSION_TOKEN)).await;
    mount_session_redirect(&mock_server, SESSION_TOKEN, assertion_page(None)).await;
    Mock::given(method("GET"))
        .and(path(crate::LOGIN_PATH))
        .respond_with(crate::html(login_page(STATE_TOKEN)))
        .mount(&mock_server)
        .await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::TooManyReentries { max: 1 });

    let authn_requests = received_paths(&mock_server)
        .await
        .into_iter()
        .filter(|path| path == "/api/v1/authn")
        .count();
    assert_eq!(authn_requests, 2);
}

#[tokio::test]
async fn fail_wrong_password() {
    let (http_client, mock_server, context) = init_test().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorCode": "E0000004",
            "errorSummary": "Authentication failed",
        })))
        .mount(&mock_server)
        .await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::Http(e) if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn fail_unexpected_status() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        json!({"status": "LOCKED_OUT", "stateToken": STATE_TOKEN}),
    )
    .await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::UnexpectedStatus { status } if status == "LOCKED_OUT");
    assert_eq!(received_paths(&mock_server).await, vec!["/api/v1/authn"]);
}

#[tokio::test]
async fn fail_success_without_session_token() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(&mock_server, json!({"status": "SUCCESS"})).await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::MissingSessionToken);
}

#[tokio::test]
async fn fail_mfa_required_without_state_token() {
    let (http_client, mock_server, context) = init_test().await;

    let factor = crate::factor(&mock_server, "sms1", "OKTA", "sms");
    mount_authn(
        &mock_server,
        json!({"status": "MFA_REQUIRED", "_embedded": {"factors": [factor]}}),
    )
    .await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::MissingStateToken);
}

#[tokio::test]
async fn fail_mfa_required_without_factors() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(&mock_server, mfa_required(vec![])).await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::Mfa(MfaError::NoFactors));
}

#[tokio::test]
async fn fail_malformed_response() {
    let (http_client, mock_server, context) = init_test().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn"))
        .respond_with(crate::html("<html>Maintenance</html>"))
        .mount(&mock_server)
        .await;

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(error, AuthenticationError::Json(_));
}

#[tokio::test]
async fn fail_cancelled() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(&mock_server, authn_success(SESSION_TOKEN)).await;
    context.cancellation_token().cancel();

    let error = authenticate(
        &http_client,
        &context,
        &ScriptedPrompter::default(),
        credentials(),
    )
    .await
    .unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Interrupted(Interrupted::Cancelled)
    );
    assert!(received_paths(&mock_server).await.is_empty());
}
