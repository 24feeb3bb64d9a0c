// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{fmt, sync::LazyLock};

use scraper::{Html, Selector};
use url::Url;

use super::{input_value, selector};

/// The steps of the flow a document can be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedDocument {
    /// The form posting to the relying party.
    ///
    /// Without a SAML response, the identity provider wants the login flow to
    /// start over.
    AssertionRedirectForm {
        /// The base64 SAML response, if the form carries one.
        saml_response: Option<String>,
    },

    /// A form carrying a SAML request, to be submitted.
    SamlRequestForm,

    /// A form resuming the flow with a relay state, to be submitted.
    ResumeForm,

    /// A form carrying a SAML response to an intermediate party, to be
    /// submitted.
    SamlResponseForm,

    /// None of the above.
    Unknown,
}

impl ClassifiedDocument {
    pub(super) fn of(html: &Html, base: &Url, consumer_url: &Url) -> Self {
        static FORM: LazyLock<Selector> = LazyLock::new(|| selector("form"));
        static SAML_REQUEST: LazyLock<Selector> =
            LazyLock::new(|| selector(r#"input[name="SAMLRequest"]"#));
        static RELAY_STATE: LazyLock<Selector> =
            LazyLock::new(|| selector(r#"input[name="RelayState"]"#));
        static SAML_RESPONSE: LazyLock<Selector> =
            LazyLock::new(|| selector(r#"input[name="SAMLResponse"]"#));

        let consumer_forms = html
            .select(&FORM)
            .filter(|form| {
                form.attr("action")
                    .and_then(|action| base.join(action).ok())
                    .is_some_and(|action| action == *consumer_url)
            })
            .count();

        if consumer_forms == 1 {
            return Self::AssertionRedirectForm {
                saml_response: input_value(html, "SAMLResponse"),
            };
        }

        if html.select(&SAML_REQUEST).count() == 1 {
            Self::SamlRequestForm
        } else if html.select(&RELAY_STATE).count() == 1 {
            Self::ResumeForm
        } else if html.select(&SAML_RESPONSE).count() == 1 {
            Self::SamlResponseForm
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ClassifiedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssertionRedirectForm {
                saml_response: Some(_),
            } => f.write_str("assertion redirect form"),
            Self::AssertionRedirectForm {
                saml_response: None,
            } => f.write_str("assertion redirect form without response"),
            Self::SamlRequestForm => f.write_str("SAML request form"),
            Self::ResumeForm => f.write_str("resume form"),
            Self::SamlResponseForm => f.write_str("SAML response form"),
            Self::Unknown => f.write_str("unknown document"),
        }
    }
}
