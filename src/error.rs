//! Error types for buffer operations.

use thiserror::Error;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Error types for buffer operations
///
/// Delivery actions return [`BufferError::Delivery`] to signal a failed batch.
/// The flush chain consumes these internally, re-buffering the batch and
/// retrying, so no delivery error ever reaches an `add` caller.
#[derive(Error, Debug)]
pub enum BufferError {
    /// Delivery action failed for a batch
    ///
    /// The buffer treats every delivery failure identically: the batch is
    /// re-inserted at the front and retried on the next chain iteration.
    #[error("Delivery failed: {message}")]
    Delivery {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error - detected at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BufferError {
    /// Check if this error is a delivery failure
    pub fn is_delivery(&self) -> bool {
        matches!(self, BufferError::Delivery { .. })
    }

    /// Create a delivery error from a message
    pub fn delivery(message: impl Into<String>) -> Self {
        BufferError::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Create a delivery error with source
    pub fn delivery_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BufferError::Delivery {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        BufferError::Configuration(message.into())
    }
}
