// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use assert_matches::assert_matches;
use serde_json::json;
use sso_idp_client::{
    AuthenticationError, MfaPreference, PromptError, authenticate, error::MfaError,
};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, method, path},
};

use crate::{
    SAML_XML, SESSION_TOKEN, STATE_TOKEN, ScriptedPrompter, assertion_page, credentials,
    encoded_assertion, factor, init_test, mfa_required, mount_authn, mount_session_redirect,
    received_paths,
};

#[tokio::test]
async fn pass_sms_by_preference() {
    let (http_client, mock_server, context) = init_test().await;
    let context = context.with_mfa_preference(MfaPreference::from("SMS"));

    mount_authn(
        &mock_server,
        mfa_required(vec![
            factor(&mock_server, "dsf1", "DUO", "web"),
            factor(&mock_server, "sms1", "OKTA", "sms"),
        ]),
    )
    .await;

    // The first factor of the list must not be used
    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/dsf1/verify"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/sms1/verify"))
        .and(body_json(json!({"stateToken": STATE_TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stateToken": STATE_TOKEN,
            "status": "MFA_CHALLENGE",
            "factorResult": "CHALLENGE",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/sms1/verify"))
        .and(body_json(
            json!({"stateToken": STATE_TOKEN, "passCode": "123456"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "sessionToken": SESSION_TOKEN,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_session_redirect(
        &mock_server,
        SESSION_TOKEN,
        assertion_page(Some(&encoded_assertion())),
    )
    .await;

    let prompter = ScriptedPrompter::new(&[], &["123456"]);
    let assertion = authenticate(&http_client, &context, &prompter, credentials())
        .await
        .unwrap();

    assert_eq!(assertion.xml(), SAML_XML);
    assert_eq!(prompter.prompts(), vec!["Enter verification code"]);
}

#[tokio::test]
async fn pass_totp_chosen_by_user() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        mfa_required(vec![
            factor(&mock_server, "push1", "OKTA", "push"),
            factor(&mock_server, "totp1", "GOOGLE", "token:software:totp"),
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/totp1/verify"))
        .and(body_json(json!({"stateToken": STATE_TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stateToken": STATE_TOKEN,
            "status": "MFA_CHALLENGE",
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/totp1/verify"))
        .and(body_json(
            json!({"stateToken": STATE_TOKEN, "passCode": "654321"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "sessionToken": SESSION_TOKEN,
        })))
        .mount(&mock_server)
        .await;

    mount_session_redirect(
        &mock_server,
        SESSION_TOKEN,
        assertion_page(Some(&encoded_assertion())),
    )
    .await;

    let prompter = ScriptedPrompter::new(&[1], &["654321"]);
    authenticate(&http_client, &context, &prompter, credentials())
        .await
        .unwrap();

    assert_eq!(
        prompter.prompts(),
        vec!["Select which MFA option to use", "Enter verification code"]
    );
}

#[tokio::test]
async fn fail_unsupported_factor() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        mfa_required(vec![
            factor(&mock_server, "sms1", "OKTA", "sms"),
            factor(&mock_server, "u2f1", "FIDO", "u2f"),
        ]),
    )
    .await;

    let prompter = ScriptedPrompter::new(&[1], &[]);
    let error = authenticate(&http_client, &context, &prompter, credentials())
        .await
        .unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::UnsupportedFactor { identifier }) if identifier == "FIDO U2F"
    );
    // No challenge was sent
    assert_eq!(received_paths(&mock_server).await, vec!["/api/v1/authn"]);
}

#[tokio::test]
async fn fail_prompt_cancelled() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        mfa_required(vec![
            factor(&mock_server, "sms1", "OKTA", "sms"),
            factor(&mock_server, "push1", "OKTA", "push"),
        ]),
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

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::Prompt(PromptError::Cancelled))
    );
}

#[tokio::test]
async fn fail_passcode_without_session_token() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        mfa_required(vec![factor(&mock_server, "vip1", "SYMANTEC", "token")]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/authn/factors/vip1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stateToken": STATE_TOKEN,
            "status": "MFA_CHALLENGE",
        })))
        .mount(&mock_server)
        .await;

    let prompter = ScriptedPrompter::new(&[], &["000000"]);
    let error = authenticate(&http_client, &context, &prompter, credentials())
        .await
        .unwrap_err();

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::MissingSessionToken)
    );
    // The passcode is not asked again
    assert_eq!(prompter.prompts(), vec!["Enter verification code"]);
}

#[tokio::test]
async fn fail_missing_verify_link() {
    let (http_client, mock_server, context) = init_test().await;

    mount_authn(
        &mock_server,
        mfa_required(vec![json!({
            "id": "sms1",
            "factorType": "sms",
            "provider": "OKTA",
        })]),
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

    assert_matches!(
        error,
        AuthenticationError::Mfa(MfaError::MissingVerifyLink { id }) if id == "sms1"
    );
}
