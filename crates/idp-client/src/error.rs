// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The error types used in this crate.
//!
//! Every step of the login flow has its own error type, and errors bubble up
//! unconverted to the caller of [`authenticate`](crate::authenticate).

use thiserror::Error;

use crate::prompt::PromptError;

/// A waiting operation was stopped before the identity provider answered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The deadline of the login attempt was reached.
    #[error("the login attempt took too long")]
    DeadlineExceeded,

    /// The login attempt was cancelled by the caller.
    #[error("the login attempt was cancelled")]
    Cancelled,
}

/// Errors when building a [`FlowContext`](crate::FlowContext).
#[derive(Debug, Error)]
pub enum FlowContextError {
    /// The login URL doesn't point to an http(s) host.
    #[error("login URL {0} must be an absolute http(s) URL")]
    InvalidLoginUrl(url::Url),

    /// An endpoint URL could not be derived from the login URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// All possible errors of a login attempt.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The primary authentication request failed.
    #[error("error retrieving auth response")]
    Http(#[from] reqwest::Error),

    /// The primary authentication response is not what was expected.
    #[error("malformed auth response")]
    Json(#[from] serde_json::Error),

    /// The identity provider answered with a status this client can't handle.
    #[error("unexpected authentication status {status:?}")]
    UnexpectedStatus {
        /// The status returned by the identity provider.
        status: String,
    },

    /// The authentication succeeded but no session token came with it.
    #[error("session token is missing from the auth response")]
    MissingSessionToken,

    /// A second factor is required but no state token came with it.
    #[error("state token is missing from the auth response")]
    MissingStateToken,

    /// The multi-factor authentication failed.
    #[error("error verifying MFA")]
    Mfa(#[from] MfaError),

    /// Following the documents up to the SAML assertion failed.
    #[error("error following the SAML flow")]
    Follow(#[from] FollowError),

    /// The identity provider kept asking to restart the login flow.
    #[error("the login flow was restarted more than {max} times")]
    TooManyReentries {
        /// The configured maximum.
        max: u32,
    },

    /// The attempt was interrupted.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// All possible errors when extracting an auto-submit form.
#[derive(Debug, Error)]
pub enum FormError {
    /// There is no `form` element in the document.
    #[error("could not find form")]
    MissingForm,

    /// The form has no `action` attribute.
    #[error("could not extract form action")]
    MissingAction,

    /// The form `action` is not a valid URL.
    #[error("invalid form action")]
    InvalidAction(#[from] url::ParseError),

    /// The form `method` is not a valid HTTP method.
    #[error("invalid form method {0:?}")]
    InvalidMethod(String),
}

/// All possible errors when following documents up to the SAML assertion.
#[derive(Debug, Error)]
pub enum FollowError {
    /// A request along the way failed.
    #[error("error following")]
    Http(#[from] reqwest::Error),

    /// The auto-submit form of a document could not be extracted.
    #[error("error extracting redirect form")]
    Form(#[from] FormError),

    /// The SAML response is not valid base64.
    #[error("failed to decode saml-response")]
    AssertionDecode(#[from] base64ct::Error),

    /// The login page doesn't embed a state token.
    #[error("cannot find state token")]
    MissingStateToken,

    /// The document doesn't look like any step of the flow.
    ///
    /// The document is kept for diagnostics, but it is not part of the
    /// message.
    #[error("unknown document type")]
    UnknownDocument {
        /// Where the document was fetched from.
        url: url::Url,
        /// The HTML of the document.
        document: String,
    },

    /// The chain of documents didn't end in time.
    #[error("no SAML assertion after {max} documents")]
    TooManyHops {
        /// The configured maximum.
        max: u32,
    },

    /// The attempt was interrupted.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// All possible errors when verifying the second factor.
#[derive(Debug, Error)]
pub enum MfaError {
    /// The identity provider didn't list any factor.
    #[error("no mfa options provided")]
    NoFactors,

    /// The selected factor is not supported by this client.
    #[error("unsupported mfa provider {identifier:?}")]
    UnsupportedFactor {
        /// The `{provider} {factorType}` identifier of the factor.
        identifier: String,
    },

    /// The selected factor has no verification link.
    #[error("factor {id} has no verify link")]
    MissingVerifyLink {
        /// The ID of the factor.
        id: String,
    },

    /// Prompting the user failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A verification request failed.
    #[error("error retrieving verify response")]
    Http(#[from] reqwest::Error),

    /// A verification response is not what was expected.
    #[error("malformed verify response")]
    Json(#[from] serde_json::Error),

    /// The verification didn't return a session token.
    #[error("session token is missing from the verify response")]
    MissingSessionToken,

    /// The push notification flow failed.
    #[error(transparent)]
    Push(#[from] PushError),

    /// The Duo flow failed.
    #[error(transparent)]
    Duo(#[from] DuoError),

    /// The attempt was interrupted.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// All possible errors when waiting for a push notification approval.
#[derive(Debug, Error)]
pub enum PushError {
    /// A polling request failed.
    #[error("error retrieving verify response")]
    Http(#[from] reqwest::Error),

    /// A polling response is not what was expected.
    #[error("malformed verify response")]
    Json(#[from] serde_json::Error),

    /// The notification expired before the user answered.
    #[error("user did not accept MFA in time")]
    Timeout,

    /// The user rejected the notification.
    #[error("MFA rejected by user")]
    Rejected,

    /// The factor result is none of the known ones.
    #[error("unsupported response from the identity provider (factor result {factor_result:?})")]
    UnrecognizedResponse {
        /// The factor result, if any.
        factor_result: Option<String>,
    },

    /// The approval didn't come with a session token.
    #[error("session token is missing from the verify response")]
    MissingSessionToken,

    /// The attempt was interrupted.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// All possible errors of the Duo handshake.
#[derive(Debug, Error)]
pub enum DuoError {
    /// A request to Duo or to the identity provider failed.
    #[error("error during the Duo handshake")]
    Http(#[from] reqwest::Error),

    /// A response is not what was expected.
    #[error("malformed Duo response")]
    Json(#[from] serde_json::Error),

    /// The host of the Duo API is not usable.
    #[error("invalid Duo host")]
    InvalidHost(#[from] url::ParseError),

    /// The signature is not made of a transaction and an application part.
    #[error("malformed Duo signature")]
    MalformedSignature,

    /// The Duo frame doesn't contain a session identifier.
    #[error("unable to locate the Duo session identifier")]
    MissingSid,

    /// Prompting the user failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Duo refused to start the transaction.
    #[error("error authenticating mfa device (stat {stat:?}: {message:?})")]
    PromptRejected {
        /// The `stat` field of the response.
        stat: String,
        /// The error message, if any.
        message: Option<String>,
    },

    /// Duo didn't return a transaction identifier.
    #[error("transaction id is missing from the Duo response")]
    MissingTxid,

    /// The transaction failed, for example because the user denied it.
    #[error("failed to authenticate device")]
    Failure {
        /// The status message from Duo, if any.
        status: Option<String>,
    },

    /// The transaction succeeded without a result URL.
    #[error("result URL is missing from the Duo response")]
    MissingResultUrl,

    /// The result didn't contain the signed cookie.
    #[error("unable to get response.cookie")]
    MissingCookie,

    /// The final verification didn't return a session token.
    #[error("session token is missing from the verify response")]
    MissingSessionToken,

    /// The attempt was interrupted.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}
