//! Client surface and error types.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::options::TransportConfig;
use crate::session::{StreamHandler, StreamSession};
use crate::sse::{delta_stream, DeltaStream};
use crate::transport::{HttpTransport, Transport};

/// Errors that can occur while opening or consuming a stream.
///
/// Cancellation is not a failure of the pipeline: [`StreamError::Aborted`]
/// is surfaced through [`StreamHandler::on_abort`], never through
/// [`StreamHandler::on_error`], so callers can tell "the user stopped it"
/// apart from "it broke". Malformed frame payloads are not represented
/// here at all; the parser falls back to treating them as raw text.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Server(String),

    #[error("request encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("stream aborted")]
    Aborted,

    #[error("configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// True for user-initiated cancellation.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// A JSON-serializable request body for one streaming endpoint.
///
/// Every implementation must serialize a `stream: true` flag alongside its
/// endpoint-specific fields; the request types in [`crate::model`] set it
/// in their constructors.
pub trait StreamRequest: Serialize + Send + Sync {
    /// Endpoint path, joined onto the configured base URL.
    fn path(&self) -> &str;
}

/// Client for streaming AI endpoints.
///
/// Holds the read-only transport configuration and a shared transport.
/// One client serves any number of concurrent sessions; sessions share no
/// mutable state.
///
/// Two tiers, mirroring how consumers use the pipeline:
/// - [`StreamClient::open`] returns the raw delta stream for callers that
///   want to drive consumption themselves.
/// - [`StreamClient::run`] drives a [`StreamSession`] to its terminal
///   state, firing the session handler's callbacks.
pub struct StreamClient {
    transport: Arc<dyn Transport>,
}

impl StreamClient {
    /// Create a client over HTTP with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, StreamError> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(config)?),
        })
    }

    /// Create a client over a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Open a stream for the given request and return its deltas.
    ///
    /// Deltas arrive in order; the stream ends at the `[DONE]` sentinel or
    /// when the server closes the body. Dropping the stream tears down the
    /// connection.
    pub async fn open<R: StreamRequest>(&self, request: &R) -> Result<DeltaStream, StreamError> {
        let body = serde_json::to_value(request)?;
        let bytes = self.transport.open(request.path(), body).await?;
        let deltas: DeltaStream = Box::pin(delta_stream(bytes));
        Ok(deltas)
    }

    /// Open a stream for the given request and drive the session with it.
    ///
    /// Returns `Ok(())` on completion. An `Err` whose [`StreamError::is_abort`]
    /// is true means the session was cancelled (`on_abort` fired); any other
    /// `Err` mirrors what `on_error` received. Partial content stays readable
    /// on the session either way.
    pub async fn run<R, H>(
        &self,
        request: &R,
        session: &mut StreamSession<H>,
    ) -> Result<(), StreamError>
    where
        R: StreamRequest,
        H: StreamHandler,
    {
        let body = serde_json::to_value(request)?;
        let path = request.path().to_string();
        let transport = Arc::clone(&self.transport);

        session
            .run(async move {
                let bytes = transport.open(&path, body).await?;
                let deltas: DeltaStream = Box::pin(delta_stream(bytes));
                Ok(deltas)
            })
            .await
    }
}
