//! Cancellation handles for in-flight sessions.

use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation of one session.
///
/// Handles are cheap to clone and may be triggered from any task.
/// Cancellation is idempotent: calling [`CancelHandle::cancel`] on an
/// already-cancelled or already-finished session does nothing further.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. The session observing this handle stops
    /// processing immediately and drops its response stream, which tears
    /// down the underlying connection; the network teardown itself may
    /// finish asynchronously afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
