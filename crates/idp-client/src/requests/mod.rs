// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Methods to interact with the identity provider, and with the Duo API.
//!
//! Everything starts with [`authn::authenticate`], the other modules are the
//! steps it goes through.

pub mod authn;
pub mod duo;
pub mod follow;
pub mod mfa;
pub mod push;
