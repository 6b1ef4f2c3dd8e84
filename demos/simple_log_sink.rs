//! Simple log sink example
//!
//! Buffers log lines produced by a simulated request handler and ships them
//! to stdout in batches. Run with:
//!
//!   cargo run --example simple_log_sink

use async_trait::async_trait;
use batchbuf::{BatchBuffer, BufferConfig, BufferResult, DeliveryAction};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A sink that prints each batch to stdout
struct StdoutLogSink {
    batches_shipped: AtomicU64,
}

#[async_trait]
impl DeliveryAction<String> for StdoutLogSink {
    async fn deliver(&self, batch: &[String]) -> BufferResult<()> {
        let n = self.batches_shipped.fetch_add(1, Ordering::Relaxed) + 1;
        println!("=== Batch #{} ({} lines) ===", n, batch.len());
        for line in batch {
            println!("{line}");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> BufferResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let mut config = BufferConfig {
        name: "demo-log-buffer".to_string(),
        capacity: 8,
        flush_interval_ms: 500,
        ..Default::default()
    };
    config.apply_env_overrides();

    let sink = Arc::new(StdoutLogSink {
        batches_shipped: AtomicU64::new(0),
    });
    let buffer = BatchBuffer::new(sink, config)?;

    // Simulate request handlers emitting log lines faster than they flush.
    for i in 0..30 {
        buffer.add(format!("handled request {i}"));
        tokio::time::sleep(Duration::from_millis(40)).await;
    }

    // Let the final timer flush drain whatever is left.
    buffer.flush();
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("remaining buffered items: {}", buffer.len());
    Ok(())
}
