//! Transport seam between the client and the network.
//!
//! The pipeline is parameterized over this trait so the decode/parse/
//! accumulate stages never touch HTTP directly. The default
//! implementation is [`HttpTransport`] over `reqwest`; tests and embedders
//! can substitute their own byte source.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::client::StreamError;
use crate::http::{add_extra_headers, build_http_client, error_from_response};
use crate::options::TransportConfig;

/// Raw bytes of one streamed response body, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// Opens streamed responses for JSON request bodies.
///
/// One open call holds one connection for the lifetime of the returned
/// stream; dropping the stream releases it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request to `path` with the given JSON body and return the
    /// response body as a byte stream.
    ///
    /// Fails with [`StreamError::Network`] when the request cannot be sent
    /// and [`StreamError::Server`] on a non-success status.
    async fn open(&self, path: &str, body: Value) -> Result<ByteStream, StreamError>;
}

/// HTTP transport over a shared `reqwest` client.
pub struct HttpTransport {
    config: TransportConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport from configuration. The underlying HTTP client
    /// is constructed once and reused across sessions.
    pub fn new(config: TransportConfig) -> Result<Self, reqwest::Error> {
        let http = build_http_client(&config)?;
        Ok(Self { config, http })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, path: &str, body: Value) -> Result<ByteStream, StreamError> {
        let url = self.endpoint_url(path);
        tracing::debug!(%url, "opening stream");

        let mut req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(api_key) = &self.config.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()));
        }
        req = add_extra_headers(req, &self.config.extra_headers);

        let response = req.json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "streaming request rejected");
            return Err(error_from_response(status, &body));
        }

        let bytes: ByteStream = Box::pin(response.bytes_stream().map_err(StreamError::from));
        Ok(bytes)
    }
}
