// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Utilities to do HTTP requests against the identity provider and the
//! second-factor providers.
//!
//! Every request of one login attempt goes through the same
//! [`reqwest::Client`], so that cookies set along the redirect chain are
//! replayed the way a browser would.

#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

mod reqwest;

pub use self::reqwest::{
    ClientBuildError, ClientOptions, RequestBuilderExt, client as reqwest_client, redacted_url,
};
