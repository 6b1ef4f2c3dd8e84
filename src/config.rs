//! Configuration for batch buffers.

use crate::{BufferError, BufferResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for a [`BatchBuffer`](crate::BatchBuffer)
///
/// All fields have defaults, so `BufferConfig::default()` is a working
/// starting point. Configuration can also be loaded from a TOML file and
/// overridden from `BATCHBUF_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Buffer name, used as a label on metrics and log output
    #[serde(default = "default_name")]
    pub name: String,

    /// Maximum items taken per flush, and the size-trigger threshold
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Interval between a timer arming and its flush firing, and the delay
    /// between retry attempts within one flush chain, in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Maximum consecutive retry attempts within one flush chain
    #[serde(default = "default_max_retry_depth")]
    pub max_retry_depth: u32,
}

fn default_name() -> String {
    "batch-buffer".to_string()
}
fn default_capacity() -> usize {
    100
}
fn default_flush_interval_ms() -> u64 {
    1000
}
fn default_max_retry_depth() -> u32 {
    5
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            capacity: default_capacity(),
            flush_interval_ms: default_flush_interval_ms(),
            max_retry_depth: default_max_retry_depth(),
        }
    }
}

impl BufferConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> BufferResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BufferError::config(format!("Failed to read config file {}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            BufferError::config(format!("Failed to parse config file {}: {}", path, e))
        })
    }

    /// Apply environment variable overrides
    ///
    /// Recognized variables: `BATCHBUF_NAME`, `BATCHBUF_CAPACITY`,
    /// `BATCHBUF_FLUSH_INTERVAL_MS`, `BATCHBUF_MAX_RETRY_DEPTH`.
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("BATCHBUF_NAME") {
            self.name = val;
        }
        if let Ok(val) = env::var("BATCHBUF_CAPACITY") {
            match val.parse() {
                Ok(v) => self.capacity = v,
                Err(_) => tracing::warn!("Ignoring invalid BATCHBUF_CAPACITY: {}", val),
            }
        }
        if let Ok(val) = env::var("BATCHBUF_FLUSH_INTERVAL_MS") {
            match val.parse() {
                Ok(v) => self.flush_interval_ms = v,
                Err(_) => tracing::warn!("Ignoring invalid BATCHBUF_FLUSH_INTERVAL_MS: {}", val),
            }
        }
        if let Ok(val) = env::var("BATCHBUF_MAX_RETRY_DEPTH") {
            match val.parse() {
                Ok(v) => self.max_retry_depth = v,
                Err(_) => tracing::warn!("Ignoring invalid BATCHBUF_MAX_RETRY_DEPTH: {}", val),
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> BufferResult<()> {
        if self.name.is_empty() {
            return Err(BufferError::config("name cannot be empty"));
        }

        if self.capacity == 0 {
            return Err(BufferError::config("capacity must be > 0"));
        }

        if self.flush_interval_ms == 0 {
            return Err(BufferError::config("flush_interval_ms must be > 0"));
        }

        if self.max_retry_depth == 0 {
            return Err(BufferError::config("max_retry_depth must be > 0"));
        }

        if self.max_retry_depth > 100 {
            return Err(BufferError::config("max_retry_depth too high (max 100)"));
        }

        Ok(())
    }

    /// Flush interval as a [`Duration`]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
