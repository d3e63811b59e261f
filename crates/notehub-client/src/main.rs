//! Notehub terminal client entry point.
//!
//! Reads lines from stdin, resolves any file-reference markers through
//! the outbound pipeline, and prints the transcript of everything the
//! hub fans back. Rendering is plain strings; there is no TUI.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use notehub_client::{
    Chunker, Connection, FileStore, OutboundPipeline, Reassembler, StreamEvent, Transcript,
    fileserver,
};
use notehub_core::AppResult;
use notehub_core::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "notehub-client", about = "Notehub terminal chat client")]
struct Args {
    /// Login name for this session.
    user: String,
    /// Hub WebSocket URL (overrides configuration).
    #[arg(long)]
    target: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> AppResult<()> {
    let env = std::env::var("NOTEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env)?;
    let target = args.target.unwrap_or_else(|| config.client.target.clone());

    let store = FileStore::open(&config.client.saved_files_dir).await?;

    // Image retrieval endpoint runs for the client's lifetime.
    let endpoint_store = Arc::new(store.clone());
    let endpoint_port = config.client.fileserver_port;
    tokio::spawn(async move {
        if let Err(e) = fileserver::serve(endpoint_store, endpoint_port).await {
            tracing::error!(error = %e, "image endpoint failed");
        }
    });

    let mut connection = Connection::establish(&target, &args.user).await?;

    let chunker = Chunker::new(
        args.user.as_str(),
        store.clone(),
        config.transfer.chunk_size_bytes,
    );
    let mut pipeline = OutboundPipeline::new(args.user.as_str(), chunker, connection.sender());

    let mut reassembler = Reassembler::new(
        store,
        Transcript::new(config.client.transcript_window_seconds),
    );

    // Inbound: apply every envelope, print any transcript lines.
    let mut display_task = tokio::spawn(async move {
        while let Some(event) = connection.next_event().await {
            match event {
                StreamEvent::Envelope(envelope) => match reassembler.apply(&envelope).await {
                    Ok(lines) => {
                        for line in lines {
                            println!("{line}");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to apply envelope"),
                },
                StreamEvent::Closed { reason } => {
                    eprintln!("connection closed: {reason}");
                    break;
                }
            }
        }
    });

    // Outbound: stdin lines through the pipeline, until the stream or
    // stdin ends.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = &mut display_task => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) if !line.trim().is_empty() => pipeline.submit(&line).await?,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => return Err(e.into()),
            },
        }
    }

    Ok(())
}
