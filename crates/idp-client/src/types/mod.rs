// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Types exchanged with the identity provider and returned to the caller.

pub mod assertion;
pub mod authn;
pub mod credentials;
pub mod factor;
