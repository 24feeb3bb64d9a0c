// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::LazyLock;

use reqwest::Method;
use scraper::{Html, Selector};
use url::Url;

use super::selector;
use crate::error::FormError;

/// A form the browser would submit on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Where the form is submitted, resolved against the document URL.
    pub action: Url,

    /// The method of the form, `POST` if not set.
    pub method: Method,

    /// The named inputs which have a value, in document order.
    pub fields: Vec<(String, String)>,
}

impl Form {
    pub(super) fn extract(html: &Html, base: &Url) -> Result<Self, FormError> {
        static FORM: LazyLock<Selector> = LazyLock::new(|| selector("form"));
        static INPUT: LazyLock<Selector> = LazyLock::new(|| selector("input"));

        let form = html.select(&FORM).next().ok_or(FormError::MissingForm)?;

        let action = form.attr("action").ok_or(FormError::MissingAction)?;
        let action = base.join(action)?;

        let method = form.attr("method").unwrap_or("POST").to_ascii_uppercase();
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| FormError::InvalidMethod(method))?;

        let fields = form
            .select(&INPUT)
            .filter_map(|input| {
                let name = input.attr("name")?;
                let value = input.attr("value")?;
                Some((name.to_owned(), value.to_owned()))
            })
            .collect();

        Ok(Self {
            action,
            method,
            fields,
        })
    }

    /// Build the request submitting this form.
    ///
    /// `GET` forms send their fields in the query string, others in a
    /// urlencoded body.
    pub fn into_request(self, http_client: &reqwest::Client) -> reqwest::RequestBuilder {
        if self.method == Method::GET {
            let mut action = self.action;
            action.query_pairs_mut().extend_pairs(&self.fields);
            http_client.get(action)
        } else {
            http_client
                .request(self.method, self.action)
                .form(&self.fields)
        }
    }
}
