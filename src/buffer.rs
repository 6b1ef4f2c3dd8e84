//! The batching buffer and its flush state machine.
//!
//! Producers append items through [`BatchBuffer::add`]; flushing runs as
//! detached background chains submitted to a [`TaskRunner`]. Two atomic flags
//! coordinate the chains: `flush_in_progress` gives mutual exclusion over the
//! delivery step (overlapping attempts skip, they never block), and
//! `timer_armed` keeps at most one pending timer flush scheduled.

use crate::config::BufferConfig;
use crate::metrics::BufferMetrics;
use crate::traits::{DeliveryAction, TaskRunner, TokioTaskRunner};
use crate::BufferResult;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

/// An in-memory batching buffer with size- and time-triggered flushing
///
/// Items are appended in insertion order and delivered in batches of at most
/// `capacity` to the configured [`DeliveryAction`]. A flush is triggered when
/// an `add` finds the buffer at capacity, when the interval timer armed by the
/// first item fires, or explicitly via [`flush`](BatchBuffer::flush). Failed
/// batches are re-inserted at the front and retried up to `max_retry_depth`
/// times per chain.
///
/// The handle is cheap to clone; clones share the same buffer, so any number
/// of producer tasks can hold one and call `add` concurrently.
pub struct BatchBuffer<T> {
    inner: Arc<BufferInner<T>>,
    runner: Arc<dyn TaskRunner>,
}

impl<T> Clone for BatchBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            runner: Arc::clone(&self.runner),
        }
    }
}

impl<T: Send + 'static> BatchBuffer<T> {
    /// Create a new buffer delivering through `delivery`, spawning flush
    /// chains with `tokio::spawn`
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(delivery: Arc<dyn DeliveryAction<T>>, config: BufferConfig) -> BufferResult<Self> {
        Self::with_runner(delivery, config, Arc::new(TokioTaskRunner))
    }

    /// Create a new buffer with a custom [`TaskRunner`]
    ///
    /// The runner must allow submitted chains to run to completion
    /// independent of the code that triggered them.
    pub fn with_runner(
        delivery: Arc<dyn DeliveryAction<T>>,
        config: BufferConfig,
        runner: Arc<dyn TaskRunner>,
    ) -> BufferResult<Self> {
        config.validate()?;

        let metrics = BufferMetrics::new(&config.name);

        Ok(Self {
            inner: Arc::new(BufferInner {
                items: Mutex::new(VecDeque::new()),
                flush_in_progress: AtomicBool::new(false),
                timer_armed: AtomicBool::new(false),
                delivery,
                metrics,
                config,
            }),
            runner,
        })
    }

    /// Append an item to the buffer
    ///
    /// Never blocks on delivery and never fails: delivery errors are handled
    /// inside the detached flush chains.
    ///
    /// If the buffer is already at capacity, the current contents are
    /// snapshotted into a batch before the item is appended and a delivery
    /// chain for that batch is submitted to the runner, so the buffer stays
    /// near, but not strictly under, capacity. Adding the first item after
    /// the buffer went empty also arms the interval timer.
    pub fn add(&self, item: T) {
        // Size trigger: snapshot the batch before appending, so the new item
        // is excluded from the forced flush.
        if self.inner.len() >= self.inner.config.capacity {
            if let Some(batch) = self.inner.take_batch() {
                let inner = Arc::clone(&self.inner);
                self.runner.spawn_detached(Box::pin(async move {
                    inner.deliver_batch(batch).await;
                    if !inner.is_empty() {
                        tokio::time::sleep(inner.config.flush_interval()).await;
                        inner.flush_chain(1).await;
                    }
                }));
            }
        }

        self.inner.push(item);

        // Time trigger: at most one timer pending at a time. The flag clears
        // only once the scheduled chain has fully completed, not when it
        // starts.
        if self
            .inner
            .timer_armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let inner = Arc::clone(&self.inner);
            self.runner.spawn_detached(Box::pin(async move {
                tokio::time::sleep(inner.config.flush_interval()).await;
                inner.flush_chain(0).await;
                inner.timer_armed.store(false, Ordering::Release);
            }));
        }
    }

    /// Start a flush chain now, detached from the caller
    ///
    /// Useful for draining the buffer on shutdown or after a retry chain gave
    /// up with items still buffered. Subject to the same guards as the
    /// automatic triggers: if a flush is already delivering, this attempt is
    /// skipped.
    pub fn flush(&self) {
        let inner = Arc::clone(&self.inner);
        self.runner.spawn_detached(Box::pin(async move {
            inner.flush_chain(0).await;
        }));
    }

    /// Number of items currently buffered
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the buffer is currently empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Shared state behind every clone of a [`BatchBuffer`]
struct BufferInner<T> {
    items: Mutex<VecDeque<T>>,
    /// True while a flush is executing its delivery step
    flush_in_progress: AtomicBool,
    /// True while a timer-triggered flush chain is scheduled or running
    timer_armed: AtomicBool,
    delivery: Arc<dyn DeliveryAction<T>>,
    metrics: BufferMetrics,
    config: BufferConfig,
}

impl<T: Send + 'static> BufferInner<T> {
    fn lock_items(&self) -> MutexGuard<'_, VecDeque<T>> {
        // A poisoned lock only means a panic elsewhere; the queue itself is
        // still structurally valid.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn len(&self) -> usize {
        self.lock_items().len()
    }

    fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    fn push(&self, item: T) {
        let buffered = {
            let mut items = self.lock_items();
            items.push_back(item);
            items.len()
        };
        self.metrics.record_added();
        self.metrics.set_buffered(buffered);
    }

    /// Detach up to `capacity` items from the front of the buffer
    ///
    /// Returns `None` when the attempt should be skipped: either another
    /// flush holds `flush_in_progress` (its own post-delivery retry will pick
    /// up whatever remains) or the buffer is empty. On `Some`, the caller now
    /// owns `flush_in_progress` and must clear it via
    /// [`deliver_batch`](Self::deliver_batch).
    fn take_batch(&self) -> Option<Vec<T>> {
        if self.flush_in_progress.swap(true, Ordering::AcqRel) {
            self.metrics.record_flush_skipped();
            return None;
        }

        let mut items = self.lock_items();
        if items.is_empty() {
            drop(items);
            self.flush_in_progress.store(false, Ordering::Release);
            return None;
        }

        let take = items.len().min(self.config.capacity);
        Some(items.drain(..take).collect())
    }

    /// Deliver one detached batch and clear `flush_in_progress`
    ///
    /// On failure the whole batch is re-inserted at the front of the buffer,
    /// ahead of anything added while delivery was in flight, preserving its
    /// original order.
    async fn deliver_batch(&self, batch: Vec<T>) {
        let batch_size = batch.len();
        debug!(
            buffer = %self.config.name,
            batch_size,
            buffered = self.len(),
            "delivering batch"
        );

        match self.delivery.deliver(&batch).await {
            Ok(()) => {
                self.metrics.record_delivered(batch_size);
                debug!(
                    buffer = %self.config.name,
                    batch_size,
                    buffered = self.len(),
                    "batch delivered"
                );
            }
            Err(e) => {
                error!(
                    buffer = %self.config.name,
                    batch_size,
                    error = %e,
                    "delivery failed, re-buffering batch"
                );
                self.metrics.record_delivery_failure();

                let mut items = self.lock_items();
                for item in batch.into_iter().rev() {
                    items.push_front(item);
                }
            }
        }

        self.flush_in_progress.store(false, Ordering::Release);
        self.metrics.set_buffered(self.len());
    }

    /// Run one flush chain to completion
    ///
    /// The bounded-retry loop: each iteration delivers one batch, then stops
    /// if the buffer is empty, or waits one flush interval and tries again at
    /// the next depth, covering both delivery failures and items that
    /// arrived during delivery. Reaching `max_retry_depth` ends the chain
    /// with a warning; the still-buffered items wait for the next independent
    /// trigger, which starts over at depth 0.
    async fn flush_chain(&self, mut depth: u32) {
        loop {
            if depth >= self.config.max_retry_depth {
                warn!(
                    buffer = %self.config.name,
                    max_retry_depth = self.config.max_retry_depth,
                    buffered = self.len(),
                    "max retry depth reached, buffered items may be undelivered"
                );
                self.metrics.record_retries_exhausted();
                return;
            }

            let Some(batch) = self.take_batch() else {
                return;
            };

            self.deliver_batch(batch).await;

            if self.is_empty() {
                return;
            }

            depth += 1;
            tokio::time::sleep(self.config.flush_interval()).await;
        }
    }
}
