//! Streaming summary demo against a VideoChat-style backend.
//!
//! Run with:
//! ```bash
//! export VIDEOCHAT_BASE_URL="http://localhost:8000"
//! cargo run --example summary_streaming
//! ```

use std::io::Write;

use deltastream::options::TransportConfig;
use deltastream::{StreamClient, StreamSession, SummaryRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("VIDEOCHAT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    let config =
        TransportConfig::new(base_url).with_timeout(std::time::Duration::from_secs(120));
    let client = StreamClient::new(config)?;

    let request = SummaryRequest::new(
        "Today we covered ownership and borrowing, then moved on to lifetimes \
         and how the borrow checker reasons about them.",
    );

    println!("Streaming summary...\n");

    let mut session = StreamSession::new(|delta: &str| {
        print!("{delta}");
        let _ = std::io::stdout().flush();
    });

    client.run(&request, &mut session).await?;

    println!("\n\n=== Stream Complete ===");
    println!("{} characters accumulated", session.content().len());
    Ok(())
}
