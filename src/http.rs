//! HTTP client utilities for streaming requests.
//!
//! This module provides reusable HTTP client construction, header
//! plumbing, and error-body decoding shared by the transport layer.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

use crate::client::StreamError;
use crate::options::TransportConfig;

/// Build a configured HTTP client from transport configuration.
///
/// This applies common configuration like timeouts and proxies.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&config)?;
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in the configuration.
///
/// # Example
/// ```ignore
/// let mut req = client.post(url);
/// req = add_extra_headers(req, &config.extra_headers);
/// ```
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Turn a non-success response into a [`StreamError::Server`].
///
/// The server's own message is preferred when the error body parses;
/// otherwise the raw status and body are reported.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> StreamError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.error.or(parsed.message).or(parsed.detail) {
            return StreamError::Server(format!("{message} (HTTP {status})"));
        }
    }
    StreamError::Server(format!("HTTP {status}: {body}"))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    detail: Option<String>,
}
