//! Collaborator trait definitions.
//!
//! This module defines the two seams a [`BatchBuffer`](crate::BatchBuffer)
//! depends on:
//! - `DeliveryAction`: what happens to a batch when it is flushed
//! - `TaskRunner`: how flush chains are scheduled as detached work

use crate::BufferResult;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Trait for delivering a flushed batch to its destination
///
/// The buffer invokes `deliver` with a non-empty batch in insertion order and
/// waits for the outcome before deciding whether to re-buffer. The batch is
/// borrowed for the duration of the call: on failure the buffer re-inserts
/// exactly these items at the front, so the action must not rely on keeping
/// them.
///
/// Every failure is handled the same way (re-buffer and retry); there is no
/// retryable/fatal distinction at this seam.
///
/// # Example
///
/// ```rust,no_run
/// use batchbuf::{BufferError, BufferResult, DeliveryAction};
/// use async_trait::async_trait;
///
/// struct HttpSink {
///     endpoint: String,
/// }
///
/// #[async_trait]
/// impl DeliveryAction<String> for HttpSink {
///     async fn deliver(&self, batch: &[String]) -> BufferResult<()> {
///         // POST the batch to self.endpoint; map transport errors:
///         if batch.len() > 10_000 {
///             return Err(BufferError::delivery("payload too large"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait DeliveryAction<T>: Send + Sync {
    /// Deliver one batch of items
    async fn deliver(&self, batch: &[T]) -> BufferResult<()>;
}

/// A detached unit of asynchronous work
pub type DetachedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Trait for running flush chains detached from their trigger
///
/// The buffer submits one task per flush-triggering event (size trigger,
/// armed timer, manual flush). The runner must let the task run to
/// completion independent of the caller's lifetime: a flush chain keeps
/// retrying after the request that triggered it has already returned its
/// response. Nothing awaits the submitted task.
pub trait TaskRunner: Send + Sync {
    /// Submit a task to run to completion in the background
    fn spawn_detached(&self, task: DetachedTask);
}

/// Default [`TaskRunner`] backed by `tokio::spawn`
///
/// Requires a running Tokio runtime; spawned chains live as long as the
/// runtime does, which satisfies the detachment requirement for long-lived
/// services.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTaskRunner;

impl TaskRunner for TokioTaskRunner {
    fn spawn_detached(&self, task: DetachedTask) {
        tokio::spawn(task);
    }
}
