//! Streaming sessions: content accumulation and callback dispatch.
//!
//! A [`StreamSession`] owns the state of one streaming request from
//! initiation to completion, error, or abort. Deltas are forwarded to the
//! session's [`StreamHandler`] synchronously and in arrival order; the
//! accumulated content is append-only while streaming and frozen once a
//! terminal callback has fired, until [`StreamSession::reset`] starts a
//! fresh session.

use std::future::Future;

use futures::StreamExt;

use crate::cancel::CancelHandle;
use crate::client::StreamError;
use crate::sse::DeltaStream;

/// Consumer callbacks for one streaming session.
///
/// Exactly one of the terminal callbacks (`on_complete`, `on_error`,
/// `on_abort`) fires per session. `on_chunk` is called once per delta, in
/// order; `on_complete` receives the exact concatenation of every delta
/// that was forwarded.
pub trait StreamHandler: Send {
    /// A new delta arrived and was appended to the accumulated content.
    fn on_chunk(&mut self, delta: &str);

    /// The stream finished; `content` is the full accumulated text.
    fn on_complete(&mut self, _content: &str) {}

    /// The stream failed. Content accumulated so far stays readable on the
    /// session; partial output is still useful to the consumer.
    fn on_error(&mut self, _error: &StreamError) {}

    /// The stream was cancelled; `partial` is the content accumulated
    /// before the abort. Never paired with `on_error`.
    fn on_abort(&mut self, _partial: &str) {}
}

/// Chunk-only handlers can be plain closures.
impl<F> StreamHandler for F
where
    F: FnMut(&str) + Send,
{
    fn on_chunk(&mut self, delta: &str) {
        self(delta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Streaming,
    Finished,
}

/// One streaming request's lifecycle and accumulated content.
///
/// A session is single-use: once it reaches a terminal state it keeps its
/// content (and error, if any) readable until [`StreamSession::reset`].
/// Running requires `&mut self`, so starting a second stream on a session
/// that is already streaming is unrepresentable; independent concurrent
/// streams are simply independent sessions.
///
/// # Example
/// ```no_run
/// use deltastream::options::TransportConfig;
/// use deltastream::{StreamClient, StreamSession, SummaryRequest};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StreamClient::new(TransportConfig::new("http://localhost:8000"))?;
/// let mut session = StreamSession::new(|delta: &str| print!("{delta}"));
/// client.run(&SummaryRequest::new("lecture transcript"), &mut session).await?;
/// println!("\n{}", session.content());
/// # Ok(())
/// # }
/// ```
pub struct StreamSession<H> {
    handler: H,
    content: String,
    error: Option<String>,
    state: SessionState,
    cancel: CancelHandle,
}

impl<H: StreamHandler> StreamSession<H> {
    /// Create an idle session around the given handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            content: String::new(),
            error: None,
            state: SessionState::Idle,
            cancel: CancelHandle::new(),
        }
    }

    /// A handle that cancels this session. Valid for the current session
    /// only; [`StreamSession::reset`] invalidates previously issued
    /// handles.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// The content accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True while a stream is being consumed.
    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    /// The failure message, if the session ended in an error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Borrow the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Consume the session, returning its handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Discard the finished session's state and start a fresh one.
    ///
    /// Clears the accumulated content and error and replaces the cancel
    /// handle, so a cancellation requested against the previous session
    /// cannot abort the new one.
    pub fn reset(&mut self) {
        self.content.clear();
        self.error = None;
        self.state = SessionState::Idle;
        self.cancel = CancelHandle::new();
    }

    /// Drive an already-opened delta stream to a terminal state.
    pub async fn drive(&mut self, deltas: DeltaStream) -> Result<(), StreamError> {
        self.run(async move { Ok(deltas) }).await
    }

    /// Open a stream via `open` and drive it to a terminal state.
    ///
    /// Cancellation covers the handshake as well: aborting while `open` is
    /// still awaiting response headers drops the request and fires
    /// `on_abort`. Returns `Ok(())` after `on_complete`, `Err(Aborted)`
    /// after `on_abort`, and any other `Err` after `on_error`. A session
    /// that already ran returns a configuration error without touching the
    /// stream or firing callbacks; call [`StreamSession::reset`] first.
    pub async fn run<F>(&mut self, open: F) -> Result<(), StreamError>
    where
        F: Future<Output = Result<DeltaStream, StreamError>>,
    {
        if self.state != SessionState::Idle {
            return Err(StreamError::Config(
                "session already consumed; call reset() before streaming again".to_string(),
            ));
        }
        self.state = SessionState::Streaming;
        tracing::debug!("stream session started");

        let cancel = self.cancel.clone();

        let mut deltas = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(self.finish_aborted()),
            opened = open => match opened {
                Ok(stream) => stream,
                Err(error) => return Err(self.finish_with(error)),
            },
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.finish_aborted()),
                item = deltas.next() => match item {
                    Some(Ok(delta)) => {
                        self.content.push_str(&delta);
                        self.handler.on_chunk(&delta);
                    }
                    Some(Err(error)) => return Err(self.finish_with(error)),
                    None => {
                        self.finish_completed();
                        return Ok(());
                    }
                },
            }
        }
    }

    fn finish_completed(&mut self) {
        self.state = SessionState::Finished;
        tracing::debug!(chars = self.content.len(), "stream session completed");
        self.handler.on_complete(&self.content);
    }

    fn finish_with(&mut self, error: StreamError) -> StreamError {
        if error.is_abort() {
            return self.finish_aborted();
        }
        self.state = SessionState::Finished;
        self.error = Some(error.to_string());
        tracing::debug!(%error, "stream session failed");
        self.handler.on_error(&error);
        error
    }

    fn finish_aborted(&mut self) -> StreamError {
        self.state = SessionState::Finished;
        tracing::debug!(chars = self.content.len(), "stream session aborted");
        self.handler.on_abort(&self.content);
        StreamError::Aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    use crate::sse::delta_stream;

    #[derive(Default)]
    struct Recorded {
        chunks: Vec<String>,
        completed: Vec<String>,
        errors: Vec<String>,
        aborted: Vec<String>,
    }

    impl StreamHandler for Recorded {
        fn on_chunk(&mut self, delta: &str) {
            self.chunks.push(delta.to_string());
        }
        fn on_complete(&mut self, content: &str) {
            self.completed.push(content.to_string());
        }
        fn on_error(&mut self, error: &StreamError) {
            self.errors.push(error.to_string());
        }
        fn on_abort(&mut self, partial: &str) {
            self.aborted.push(partial.to_string());
        }
    }

    fn pipeline_over(chunks: Vec<&'static [u8]>) -> DeltaStream {
        let parts: Vec<Result<Bytes, StreamError>> =
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))).collect();
        Box::pin(delta_stream(stream::iter(parts)))
    }

    #[tokio::test]
    async fn completes_with_accumulated_content() {
        let mut session = StreamSession::new(Recorded::default());
        let deltas = pipeline_over(vec![
            b"data: Hel",
            b"lo wor",
            b"ld\ndata: {\"content\":\"!\"}\n",
            b"data: [DONE]\n",
        ]);

        session.drive(deltas).await.expect("stream completes");

        assert_eq!(session.content(), "Hello world!");
        assert!(!session.is_streaming());
        assert_eq!(session.error(), None);

        let recorded = session.into_handler();
        assert_eq!(recorded.chunks, vec!["Hello world", "!"]);
        assert_eq!(recorded.completed, vec!["Hello world!"]);
        assert!(recorded.errors.is_empty());
        assert!(recorded.aborted.is_empty());
    }

    #[tokio::test]
    async fn stream_error_fires_on_error_and_keeps_partial_content() {
        let mut session = StreamSession::new(Recorded::default());
        let deltas: DeltaStream = Box::pin(stream::iter(vec![
            Ok("partial".to_string()),
            Err(StreamError::Server("boom (HTTP 500)".to_string())),
        ]));

        let err = session.drive(deltas).await.expect_err("stream fails");
        assert!(!err.is_abort());

        assert_eq!(session.content(), "partial");
        assert_eq!(session.error(), Some("server error: boom (HTTP 500)"));

        let recorded = session.into_handler();
        assert_eq!(recorded.chunks, vec!["partial"]);
        assert_eq!(recorded.errors.len(), 1);
        assert!(recorded.completed.is_empty());
        assert!(recorded.aborted.is_empty());
    }

    #[tokio::test]
    async fn abort_mid_stream_keeps_deltas_processed_so_far() {
        let mut session = StreamSession::new(Recorded::default());
        let cancel = session.cancel_handle();

        // Yields one delta, then cancels its own session and stalls.
        let trigger = cancel.clone();
        let deltas: DeltaStream = Box::pin(async_stream::stream! {
            yield Ok("first".to_string());
            trigger.cancel();
            trigger.cancel(); // second call is a no-op
            futures::future::pending::<()>().await;
            yield Ok("never".to_string());
        });

        let err = session.drive(deltas).await.expect_err("stream aborts");
        assert!(err.is_abort());

        assert_eq!(session.content(), "first");
        assert_eq!(session.error(), None);

        let recorded = session.into_handler();
        assert_eq!(recorded.chunks, vec!["first"]);
        assert_eq!(recorded.aborted, vec!["first"]);
        assert!(recorded.completed.is_empty());
        assert!(recorded.errors.is_empty());
    }

    #[tokio::test]
    async fn abort_before_start_skips_the_handshake() {
        let mut session = StreamSession::new(Recorded::default());
        session.cancel_handle().cancel();

        let err = session
            .run(async {
                let deltas: DeltaStream =
                    Box::pin(stream::iter(vec![Ok("unreachable".to_string())]));
                Ok(deltas)
            })
            .await
            .expect_err("aborted before start");
        assert!(err.is_abort());

        let recorded = session.into_handler();
        assert!(recorded.chunks.is_empty());
        assert_eq!(recorded.aborted, vec![""]);
    }

    #[tokio::test]
    async fn abort_during_handshake_fires_on_abort() {
        let mut session = StreamSession::new(Recorded::default());
        let cancel = session.cancel_handle();

        let err = session
            .run(async move {
                cancel.cancel();
                futures::future::pending::<()>().await;
                unreachable!("handshake is dropped on cancel")
            })
            .await
            .expect_err("aborted during handshake");
        assert!(err.is_abort());
        assert_eq!(session.into_handler().aborted.len(), 1);
    }

    #[tokio::test]
    async fn handshake_failure_fires_on_error() {
        let mut session = StreamSession::new(Recorded::default());
        let err = session
            .run(async { Err(StreamError::Server("bad gateway (HTTP 502)".to_string())) })
            .await
            .expect_err("handshake fails");
        assert!(!err.is_abort());

        let recorded = session.into_handler();
        assert_eq!(recorded.errors.len(), 1);
        assert!(recorded.aborted.is_empty());
    }

    #[tokio::test]
    async fn consumed_session_requires_reset() {
        let mut session = StreamSession::new(Recorded::default());
        session
            .drive(pipeline_over(vec![b"data: one\ndata: [DONE]\n"]))
            .await
            .expect("first run completes");

        let err = session
            .drive(pipeline_over(vec![b"data: two\ndata: [DONE]\n"]))
            .await
            .expect_err("second run without reset");
        assert!(matches!(err, StreamError::Config(_)));
        // The rejected run fired no callbacks and froze the content.
        assert_eq!(session.content(), "one");

        session.reset();
        assert_eq!(session.content(), "");
        session
            .drive(pipeline_over(vec![b"data: two\ndata: [DONE]\n"]))
            .await
            .expect("run after reset completes");
        assert_eq!(session.content(), "two");

        let recorded = session.into_handler();
        assert_eq!(recorded.completed, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn reset_discards_previous_cancellation() {
        let mut session = StreamSession::new(Recorded::default());
        let old_cancel = session.cancel_handle();
        old_cancel.cancel();
        session.drive(pipeline_over(vec![b"data: x\n"])).await.expect_err("aborted");

        session.reset();
        // The old handle belongs to the finished session.
        old_cancel.cancel();
        session
            .drive(pipeline_over(vec![b"data: fresh\ndata: [DONE]\n"]))
            .await
            .expect("new session unaffected");
        assert_eq!(session.content(), "fresh");
    }

    #[tokio::test]
    async fn closure_handler_receives_chunks() {
        let mut seen = Vec::new();
        {
            let mut session = StreamSession::new(|delta: &str| seen.push(delta.to_string()));
            session
                .drive(pipeline_over(vec![b"data: a\ndata: b\ndata: [DONE]\n"]))
                .await
                .expect("completes");
            assert_eq!(session.content(), "ab");
        }
        assert_eq!(seen, vec!["a", "b"]);
    }
}
