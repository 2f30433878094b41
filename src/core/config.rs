//! Buffered stream configuration

use super::buffer::DEFAULT_BASE_CAPACITY;
use super::error::{Result, StreamError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default separator placed between entries of a flattened blob
pub const DEFAULT_SEPARATOR: u8 = b'\n';

/// Smallest non-zero flush interval accepted by [`BufferedStreamConfig::validate`]
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(1);

/// Callback for failures that cannot be returned to a caller
///
/// Invoked from background threads: the write-path transmitter and the
/// autonomous routine supervisor.
pub type FatalCallback = Arc<dyn Fn(StreamError) + Send + Sync>;

/// Fatal callback used when none is configured: one diagnostic line on stderr
pub fn default_fatal_callback() -> FatalCallback {
    Arc::new(|err: StreamError| {
        eprintln!("[STREAM FATAL] Buffered stream failure: {}", err);
    })
}

/// Plain-value settings for a [`BufferedStream`](crate::core::BufferedStream)
///
/// # Example
///
/// ```
/// use rust_stream_logger::core::BufferedStreamConfig;
/// use std::time::Duration;
///
/// let config = BufferedStreamConfig {
///     capacity_limit: 50,
///     flush_interval: Duration::from_secs(5),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferedStreamConfig {
    /// Flush when this many entries are pending; 0 disables the trigger
    pub capacity_limit: usize,

    /// Flush on this schedule; zero disables the trigger
    pub flush_interval: Duration,

    /// Slots allocated for each fresh buffer generation
    pub base_capacity: usize,

    pub separator: u8,
}

impl Default for BufferedStreamConfig {
    fn default() -> Self {
        Self {
            capacity_limit: 0,
            flush_interval: Duration::ZERO,
            base_capacity: DEFAULT_BASE_CAPACITY,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl BufferedStreamConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.flush_interval.is_zero() && self.flush_interval < MIN_FLUSH_INTERVAL {
            return Err(StreamError::config(
                "BufferedStream",
                format!(
                    "flush interval {:?} is below the minimum of {:?}",
                    self.flush_interval, MIN_FLUSH_INTERVAL
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BufferedStreamConfig::default();
        assert_eq!(config.capacity_limit, 0);
        assert!(config.flush_interval.is_zero());
        assert_eq!(config.base_capacity, DEFAULT_BASE_CAPACITY);
        assert_eq!(config.separator, b'\n');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_tiny_interval() {
        let config = BufferedStreamConfig {
            flush_interval: Duration::from_micros(10),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StreamError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: BufferedStreamConfig =
            serde_json::from_str(r#"{"capacity_limit": 10}"#).unwrap();
        assert_eq!(config.capacity_limit, 10);
        assert_eq!(config.base_capacity, DEFAULT_BASE_CAPACITY);
        assert_eq!(config.separator, DEFAULT_SEPARATOR);
    }
}
