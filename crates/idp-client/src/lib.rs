// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! A headless client for the login flow of an [Okta]-style identity provider,
//! producing a [SAML 2.0] assertion for a relying party like AWS.
//!
//! # Scope
//!
//! The crate replays what a browser does when logging in to a SAML
//! application through the identity provider:
//!
//! - primary authentication with a username and password through the
//!   `/api/v1/authn` API, see [`requests::authn`];
//! - multi-factor authentication, see [`requests::mfa`], including:
//!   - one-time passcodes (SMS, software and hardware TOTP),
//!   - push notifications with approval polling, see [`requests::push`],
//!   - the [Duo] web SDK handshake against a separate factor provider, see
//!     [`requests::duo`];
//! - exchange of the session token for a browser session, then following the
//!   chain of auto-submitting HTML forms until the SAML response shows up, see
//!   [`requests::follow`] and [`document`].
//!
//! Prompting the user is delegated to a [`Prompter`] implementation, and the
//! HTTP transport is a [`reqwest::Client`] built by [`sso_http`].
//!
//! Every waiting loop is bounded by the deadline and the cancellation token of
//! the [`FlowContext`].
//!
//! [Okta]: https://developer.okta.com/docs/reference/api/authn/
//! [SAML 2.0]: https://docs.oasis-open.org/security/saml/v2.0/
//! [Duo]: https://duo.com/docs/duoweb-v2

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod context;
pub mod document;
pub mod error;
pub mod prompt;
pub mod requests;
pub mod types;

pub use self::{
    context::{DEFAULT_CONSUMER_URL, FlowContext, MfaPreference},
    error::AuthenticationError,
    prompt::{PromptError, Prompter},
    requests::authn::authenticate,
    types::{
        assertion::Assertion,
        credentials::{Credentials, DuoMethod},
    },
};

/// A plain client for tests which only build requests or never send them
#[cfg(test)]
fn test_http_client() -> reqwest::Client {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    reqwest::Client::new()
}
