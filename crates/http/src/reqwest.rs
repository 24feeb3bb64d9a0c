// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::time::Duration;

use headers::{ContentLength, HeaderMapExt as _, UserAgent};
use rustls_platform_verifier::ConfigVerifierExt;
use thiserror::Error;
use tokio::time::Instant;
use tracing::Instrument;
use url::Url;

static USER_AGENT: &str = concat!("sso-login/", env!("CARGO_PKG_VERSION"));

/// Knobs used when building the HTTP client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Total timeout of a single request
    pub timeout: Duration,

    /// Timeout for establishing the TCP/TLS connection
    pub connect_timeout: Duration,

    /// Accept any TLS certificate. Only meant for lab setups with
    /// self-signed identity providers.
    pub skip_verify: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            skip_verify: false,
        }
    }
}

/// Errors that can happen when building the HTTP client
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The platform TLS verifier could not be set up
    #[error("failed to create TLS config")]
    Tls(#[from] rustls::Error),

    /// reqwest refused the client configuration
    #[error("failed to create HTTP client")]
    Reqwest(#[from] reqwest::Error),
}

/// Create a new [`reqwest::Client`] with sane parameters.
///
/// The client keeps a cookie jar, which is required to replay the chain of
/// auto-submitting forms of the identity provider.
///
/// # Errors
///
/// Returns an error if the TLS configuration or the client cannot be built
pub fn client(options: &ClientOptions) -> Result<reqwest::Client, ClientBuildError> {
    let builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout);

    let builder = if options.skip_verify {
        tracing::warn!("TLS certificate verification is disabled");
        builder.danger_accept_invalid_certs(true)
    } else {
        // The explicit typing here is because `use_preconfigured_tls` accepts
        // `Any`, but wants a `ClientConfig` under the hood.
        let tls_config: rustls::ClientConfig = rustls::ClientConfig::with_platform_verifier()?;
        builder.use_preconfigured_tls(tls_config)
    };

    Ok(builder.build()?)
}

/// Strip the query string, fragment and credentials of a URL before it ends up
/// in logs. Session tokens travel in query strings.
#[must_use]
pub fn redacted_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url.set_fragment(None);
    let _ = url.set_password(None);
    let _ = url.set_username("");
    url
}

async fn send_traced(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let start = Instant::now();
    let (client, request) = request.build_split();
    let request = request?;

    let headers = request.headers();
    let server_address = request.url().host_str().map(ToOwned::to_owned);
    let server_port = request.url().port_or_known_default();
    let user_agent = headers
        .typed_get::<UserAgent>()
        .map(tracing::field::display);
    let content_length = headers.typed_get().map(|ContentLength(len)| len);
    let method = request.method().to_string();
    let url = redacted_url(request.url());

    let span = tracing::info_span!(
        "http.client.request",
        "otel.kind" = "client",
        "otel.status_code" = tracing::field::Empty,
        "http.request.method" = method,
        "url.full" = %url,
        "http.response.status_code" = tracing::field::Empty,
        "server.address" = server_address,
        "server.port" = server_port,
        "http.request.body.size" = content_length,
        "http.response.body.size" = tracing::field::Empty,
        "user_agent.original" = user_agent,
        "rust.error" = tracing::field::Empty,
    );

    async move {
        let span = tracing::Span::current();
        let result = client.execute(request).await;
        let duration_ms: u64 = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);

        match &result {
            Ok(response) => {
                span.record("otel.status_code", "OK");
                span.record("http.response.status_code", response.status().as_u16());

                if let Some(ContentLength(content_length)) = response.headers().typed_get() {
                    span.record("http.response.body.size", content_length);
                }
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("rust.error", err as &dyn std::error::Error);
            }
        }

        tracing::trace!(duration_ms, "HTTP request done");

        result
    }
    .instrument(span)
    .await
}

async fn send_checked(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    // Redirects are followed by the client itself, so anything outside of
    // 2xx/3xx at this point is a failure of the exchange
    send_traced(request).await?.error_for_status()
}

/// An extension trait implemented for [`reqwest::RequestBuilder`] to send a
/// request with a tracing span.
pub trait RequestBuilderExt {
    /// Send the request with a tracing span, and fail on any status code that
    /// is neither a success nor a redirection.
    fn send_checked(self)
    -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn send_checked(
        self,
    ) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
        send_checked(self)
    }
}
