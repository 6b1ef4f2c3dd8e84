//! End-to-end tests for the batching buffer through its public API.

use async_trait::async_trait;
use batchbuf::{BatchBuffer, BufferConfig, BufferError, BufferResult, DeliveryAction};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Collects delivered batches, optionally failing the first N attempts.
struct CollectingSink {
    batches: Mutex<Vec<Vec<String>>>,
    failures_remaining: AtomicUsize,
    attempts: AtomicUsize,
}

impl CollectingSink {
    fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
            failures_remaining: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        })
    }

    fn delivered(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DeliveryAction<String> for CollectingSink {
    async fn deliver(&self, batch: &[String]) -> BufferResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(BufferError::delivery("sink temporarily unavailable"));
        }

        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }
}

fn item(s: &str) -> String {
    s.to_string()
}

#[tokio::test]
async fn test_capacity_two_scenario() {
    // add(a), add(b), add(c) with capacity 2: the third add forces [a, b]
    // out for delivery and appends c behind them.
    let sink = CollectingSink::new(0);
    let config = BufferConfig {
        capacity: 2,
        flush_interval_ms: 20,
        ..Default::default()
    };
    let buffer = BatchBuffer::new(sink.clone(), config).unwrap();

    buffer.add(item("a"));
    buffer.add(item("b"));
    assert_eq!(buffer.len(), 2);

    buffer.add(item("c"));
    assert_eq!(buffer.len(), 1);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let batches = sink.batches.lock().unwrap().clone();
    assert_eq!(batches[0], vec!["a", "b"]);
    assert_eq!(sink.delivered(), vec!["a", "b", "c"]);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_transient_failure_recovers_without_loss() {
    let sink = CollectingSink::new(1);
    let config = BufferConfig {
        capacity: 100,
        flush_interval_ms: 20,
        ..Default::default()
    };
    let buffer = BatchBuffer::new(sink.clone(), config).unwrap();

    buffer.add(item("x"));
    buffer.add(item("y"));

    tokio::time::sleep(Duration::from_millis(150)).await;

    // First attempt failed, second delivered the same items in order.
    assert!(sink.attempts.load(Ordering::SeqCst) >= 2);
    assert_eq!(sink.delivered(), vec!["x", "y"]);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_manual_flush_drains_before_timer() {
    let sink = CollectingSink::new(0);
    let config = BufferConfig {
        capacity: 100,
        flush_interval_ms: 10_000,
        ..Default::default()
    };
    let buffer = BatchBuffer::new(sink.clone(), config).unwrap();

    buffer.add(item("pending"));
    buffer.flush();

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(sink.delivered(), vec!["pending"]);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_add_survives_permanent_sink_failure() {
    // add never errors and items are retained when every delivery fails.
    let sink = CollectingSink::new(usize::MAX);
    let config = BufferConfig {
        capacity: 100,
        flush_interval_ms: 10,
        max_retry_depth: 2,
        ..Default::default()
    };
    let buffer = BatchBuffer::new(sink.clone(), config).unwrap();

    for i in 0..5 {
        buffer.add(format!("item-{i}"));
    }

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(buffer.len(), 5);
    assert!(sink.delivered().is_empty());
}
