//! Metrics and observability for batch buffers.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Metrics collector for a batch buffer
///
/// Records through the `metrics` facade; wire up an exporter in the host
/// application to actually publish them. All series are labeled with the
/// buffer name so multiple buffers in one process stay distinguishable.
#[derive(Debug, Clone)]
pub struct BufferMetrics {
    /// Buffer name for labeling
    name: String,
}

impl BufferMetrics {
    /// Create a new metrics collector
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        // Register metric descriptions
        Self::register_metrics();

        Self { name }
    }

    /// Register metric descriptions
    fn register_metrics() {
        // Counters
        describe_counter!(
            "batchbuf_items_added_total",
            "Total number of items added to the buffer"
        );
        describe_counter!(
            "batchbuf_batches_delivered_total",
            "Total number of batches successfully delivered"
        );
        describe_counter!(
            "batchbuf_items_delivered_total",
            "Total number of items successfully delivered"
        );
        describe_counter!(
            "batchbuf_delivery_failures_total",
            "Total number of failed delivery attempts"
        );
        describe_counter!(
            "batchbuf_flushes_skipped_total",
            "Total number of flush attempts skipped because another flush was delivering"
        );
        describe_counter!(
            "batchbuf_retries_exhausted_total",
            "Total number of flush chains that gave up after reaching the retry limit"
        );

        // Histograms
        describe_histogram!("batchbuf_batch_size", "Number of items in each delivered batch");

        // Gauges
        describe_gauge!(
            "batchbuf_buffered_items",
            "Current number of items waiting in the buffer"
        );
    }

    /// Record an item added to the buffer
    pub fn record_added(&self) {
        counter!(
            "batchbuf_items_added_total",
            "buffer" => self.name.clone(),
        )
        .increment(1);
    }

    /// Record a successfully delivered batch
    pub fn record_delivered(&self, batch_size: usize) {
        counter!(
            "batchbuf_batches_delivered_total",
            "buffer" => self.name.clone(),
        )
        .increment(1);
        counter!(
            "batchbuf_items_delivered_total",
            "buffer" => self.name.clone(),
        )
        .increment(batch_size as u64);
        histogram!(
            "batchbuf_batch_size",
            "buffer" => self.name.clone(),
        )
        .record(batch_size as f64);
    }

    /// Record a failed delivery attempt
    pub fn record_delivery_failure(&self) {
        counter!(
            "batchbuf_delivery_failures_total",
            "buffer" => self.name.clone(),
        )
        .increment(1);
    }

    /// Record a flush attempt skipped due to an in-progress flush
    pub fn record_flush_skipped(&self) {
        counter!(
            "batchbuf_flushes_skipped_total",
            "buffer" => self.name.clone(),
        )
        .increment(1);
    }

    /// Record a flush chain giving up at the retry limit
    pub fn record_retries_exhausted(&self) {
        counter!(
            "batchbuf_retries_exhausted_total",
            "buffer" => self.name.clone(),
        )
        .increment(1);
    }

    /// Set the current buffered item count
    pub fn set_buffered(&self, count: usize) {
        gauge!(
            "batchbuf_buffered_items",
            "buffer" => self.name.clone(),
        )
        .set(count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = BufferMetrics::new("test-buffer");
        assert_eq!(metrics.name, "test-buffer");
    }

    #[test]
    fn test_recording_does_not_panic_without_recorder() {
        // With no global recorder installed, recording is a no-op.
        let metrics = BufferMetrics::new("test-buffer");
        metrics.record_added();
        metrics.record_delivered(10);
        metrics.record_delivery_failure();
        metrics.record_flush_skipped();
        metrics.record_retries_exhausted();
        metrics.set_buffered(3);
    }
}
