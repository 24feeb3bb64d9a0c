// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The outcome of a successful login.

use std::{borrow::Cow, fmt};

use base64ct::{Base64, Encoding};

/// A base64-encoded SAML response, as posted to the relying party.
///
/// It is only built from strings which decode properly.
#[derive(Clone, PartialEq, Eq)]
pub struct Assertion {
    encoded: String,
    decoded: Vec<u8>,
}

impl Assertion {
    /// Check that the `SAMLResponse` value decodes, and wrap it.
    ///
    /// Whitespace is ignored, as some identity providers wrap long values.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid base64.
    pub fn from_encoded(value: &str) -> Result<Self, base64ct::Error> {
        let encoded: String = value
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let decoded = Base64::decode_vec(&encoded)?;

        Ok(Self { encoded, decoded })
    }

    /// The base64 value, as expected by the relying party.
    #[must_use]
    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    /// The raw SAML response.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.decoded
    }

    /// The SAML response as XML text.
    #[must_use]
    pub fn xml(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.decoded)
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("len", &self.decoded.len())
            .finish_non_exhaustive()
    }
}
