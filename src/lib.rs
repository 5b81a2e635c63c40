//! # deltastream - Streaming Delta Pipeline
//!
//! A small, pragmatic Rust library for consuming Server-Sent-Events-style
//! streaming responses from AI endpoints: chunked bodies are decoded
//! incrementally, split into `data:` frames, and accumulated into a
//! running text buffer with live per-delta callbacks.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Stateful UTF-8 decoding across chunk boundaries
//! - `data:` frame parsing with partial-line carry-over and `[DONE]`
//!   sentinel handling
//! - Raw-text fallback for non-JSON payloads
//! - Per-session cancellation that tears down the connection
//! - Transport-agnostic pipeline behind a trait seam
//!
//! ## Architecture
//!
//! One streaming request flows through five stages:
//!
//! 1. **Transport** ([`transport`]): opens the request, returns raw bytes
//! 2. **Decoder** ([`decode`]): bytes to text, multi-byte safe
//! 3. **Frame parser** ([`sse`]): text to `data:` payloads to deltas
//! 4. **Session** ([`session`]): accumulates deltas, fires callbacks
//! 5. **Cancellation** ([`cancel`]): aborts any of the above mid-flight
//!
//! Deltas reach the consumer in strict arrival order; the completion
//! callback receives exactly their concatenation. Cancellation surfaces
//! through its own callback, never as an error.
//!
//! ## Example
//! ```no_run
//! use deltastream::options::TransportConfig;
//! use deltastream::{ChatRequest, StreamClient, StreamSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TransportConfig::new("https://api.example.com")
//!         .with_timeout(std::time::Duration::from_secs(120));
//!     let client = StreamClient::new(config)?;
//!
//!     let request = ChatRequest::from_user("What did the lecture cover?")
//!         .with_context("…transcript…");
//!
//!     let mut session = StreamSession::new(|delta: &str| print!("{delta}"));
//!
//!     client.run(&request, &mut session).await?;
//!     println!("\n\nfull response: {}", session.content());
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod client;
pub mod decode;
pub mod http;
pub mod model;
pub mod options;
pub mod session;
pub mod sse;
pub mod transport;

// Re-exports for convenience
pub use cancel::CancelHandle;
pub use client::{StreamClient, StreamError, StreamRequest};
pub use model::{ChatMessage, ChatRequest, EvaluationRequest, Role, SummaryRequest};
pub use session::{StreamHandler, StreamSession};
pub use sse::DeltaStream;
