//! # Batchbuf
//!
//! An in-memory batching buffer for code paths where per-item delivery is too
//! expensive to perform inline: shipping logs to a sink, posting events to an
//! ingestion endpoint, and similar fire-and-forget workloads.
//!
//! Producers call [`BatchBuffer::add`], which never blocks and never fails.
//! The buffer accumulates items and hands batches to a caller-supplied
//! [`DeliveryAction`] when either trigger fires:
//!
//! - **Size trigger**: adding an item while the buffer is at capacity forces a
//!   flush of the current contents before the new item is appended.
//! - **Time trigger**: the first item added to an idle buffer arms a timer
//!   that flushes after `flush_interval_ms`, regardless of size.
//!
//! Flush chains run as detached background tasks, so delivery continues even
//! after the request that triggered it has already returned its response.
//! Failed batches are re-buffered at the front and retried up to
//! `max_retry_depth` times per chain; the target is at-least-once delivery
//! with best-effort ordering, not exactly-once and not durability across
//! restarts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batchbuf::{BatchBuffer, BufferConfig, BufferResult, DeliveryAction};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct StdoutSink;
//!
//! #[async_trait]
//! impl DeliveryAction<String> for StdoutSink {
//!     async fn deliver(&self, batch: &[String]) -> BufferResult<()> {
//!         for line in batch {
//!             println!("{line}");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> BufferResult<()> {
//!     let buffer = BatchBuffer::new(Arc::new(StdoutSink), BufferConfig::default())?;
//!
//!     // From any number of concurrent producers:
//!     buffer.add("request handled".to_string());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Non-blocking producers**: `add` snapshots and schedules; it never waits
//!   on delivery, and delivery errors never surface to it
//! - **Skip-not-block mutual exclusion**: overlapping flush attempts are
//!   no-ops, never queued; the in-progress chain picks up the remainder
//! - **Bounded retries with re-buffering**: failed batches go back to the
//!   front of the buffer in original order, ahead of later additions
//! - **Pluggable scheduling**: detached execution goes through a [`TaskRunner`]
//!   seam, defaulting to `tokio::spawn`
//! - **Observability**: structured logging via `tracing` and counters,
//!   histograms, and gauges via the `metrics` facade

mod buffer;
mod config;
mod error;
mod metrics;
mod traits;

// Re-export public API
pub use buffer::BatchBuffer;
pub use config::BufferConfig;
pub use error::{BufferError, BufferResult};
pub use metrics::BufferMetrics;
pub use traits::{DeliveryAction, DetachedTask, TaskRunner, TokioTaskRunner};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
