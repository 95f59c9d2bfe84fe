//! Relay bridge - forwards stdin lines to a broker stream
//!
//! Usage:
//!   RELAY_BROKER_ADDRESS=localhost:9092 RELAY_STREAM=events relay-bridge < events.jsonl
//!   relay-bridge --log-level debug --json-logs

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use transport_relay::{TracingLogger, TracingTracer, TransportRelay};

#[derive(Parser, Debug)]
#[command(name = "relay-bridge")]
#[command(about = "Relay newline-delimited payloads from stdin to a broker stream")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("🚀 Starting relay bridge");

    let relay = TransportRelay::new(Arc::new(TracingLogger), Arc::new(TracingTracer)).map_err(
        |e| {
            error!("Failed to configure relay: {}", e);
            e
        },
    )?;

    info!(
        stream = relay.stream(),
        tls = relay.tls_policy().is_enabled(),
        tier = %relay.config().tier,
        "Relay configured"
    );

    relay.init().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => relay.relay(line).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    let stats = relay.stats();
    info!(
        "Relay bridge stopped: {} relayed, {} failed, {} bytes",
        stats.messages_relayed, stats.messages_failed, stats.bytes_relayed
    );

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;

    // stdout stays free for whatever the pipeline pipes through
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
