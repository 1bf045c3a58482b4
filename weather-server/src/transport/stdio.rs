use std::sync::Arc;

use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use weather_core::{Dispatcher, dispatch};

/// Serve the dispatcher over newline-delimited JSON on stdin/stdout.
///
/// A line that fails to parse produces an error envelope and the loop keeps
/// reading; blank lines are skipped. The loop ends when stdin closes.
pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    info!("stdio transport ready");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let mut payload = handle_line(&dispatcher, &line).await;
        payload.push('\n');
        stdout.write_all(payload.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_line(dispatcher: &Dispatcher, line: &str) -> String {
    dispatch::dispatch_raw(dispatcher, line).await.to_json()
}
