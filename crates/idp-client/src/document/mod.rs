// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! HTML documents served along the login flow.
//!
//! The identity provider drives the browser through a chain of pages which
//! submit themselves with JavaScript. This module recognizes those pages and
//! extracts the forms they would submit.
//!
//! [`scraper::Html`] is not `Send`, so documents are kept as strings and only
//! parsed inside synchronous methods returning owned data.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

mod classify;
mod form;

pub use self::{classify::ClassifiedDocument, form::Form};
use crate::error::FormError;

static STATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var stateToken = '(.*)';").expect("state token pattern should be valid")
});

/// Build a selector from a constant.
pub(crate) fn selector(selectors: &'static str) -> Selector {
    Selector::parse(selectors).expect("selector should be valid")
}

/// An HTML document, with the URL it was served from.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    html: String,
}

impl Document {
    /// Wrap a document fetched from `url`.
    #[must_use]
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// Where the document was fetched from, after redirections.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Give back the URL and the HTML source.
    #[must_use]
    pub fn into_parts(self) -> (Url, String) {
        (self.url, self.html)
    }

    /// Find out which step of the flow this document is.
    ///
    /// `consumer_url` is the form action of the relying party which receives
    /// the SAML assertion.
    #[must_use]
    pub fn classify(&self, consumer_url: &Url) -> ClassifiedDocument {
        let html = Html::parse_document(&self.html);
        ClassifiedDocument::of(&html, &self.url, consumer_url)
    }

    /// Extract the first form of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no form, or if its action or method are
    /// invalid.
    pub fn form(&self) -> Result<Form, FormError> {
        let html = Html::parse_document(&self.html);
        Form::extract(&html, &self.url)
    }

    /// Extract the value of the first `input` with the given name.
    #[must_use]
    pub fn input_value(&self, name: &str) -> Option<String> {
        let html = Html::parse_document(&self.html);
        input_value(&html, name)
    }

    /// Extract the state token the login page embeds in its scripts.
    #[must_use]
    pub fn state_token(&self) -> Option<String> {
        extract_state_token(&self.html)
    }
}

pub(crate) fn input_value(html: &Html, name: &str) -> Option<String> {
    static INPUT: LazyLock<Selector> = LazyLock::new(|| selector("input"));

    html.select(&INPUT)
        .find(|element| element.attr("name") == Some(name))
        .and_then(|element| element.attr("value"))
        .map(ToOwned::to_owned)
}

/// Extract the state token from the source of a login page.
///
/// The page assigns it in a script, with dashes escaped as `\x2D`.
#[must_use]
pub fn extract_state_token(source: &str) -> Option<String> {
    let captures = STATE_TOKEN.captures(source)?;
    let token = captures.get(1)?.as_str().replace(r"\x2D", "-");
    Some(token)
}
