//! Chat streaming demo with a mid-stream abort.
//!
//! Starts a chat stream and cancels it after two seconds, the way a UI
//! stop button would; whatever arrived before the abort is kept.
//!
//! Run with:
//! ```bash
//! export VIDEOCHAT_BASE_URL="http://localhost:8000"
//! cargo run --example chat_abort
//! ```

use std::io::Write;

use deltastream::options::TransportConfig;
use deltastream::{ChatRequest, StreamClient, StreamSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("VIDEOCHAT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    let client = StreamClient::new(TransportConfig::new(base_url))?;

    let request = ChatRequest::from_user("Explain the whole lecture in detail.");

    let mut session = StreamSession::new(|delta: &str| {
        print!("{delta}");
        let _ = std::io::stdout().flush();
    });

    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        cancel.cancel();
    });

    match client.run(&request, &mut session).await {
        Ok(()) => println!("\n\ncompleted"),
        Err(e) if e.is_abort() => {
            println!(
                "\n\naborted, kept {} characters of partial output",
                session.content().len()
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
