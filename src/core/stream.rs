//! Stream trait for log output destinations

use super::error::{Result, StreamError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A destination for raw log bytes.
///
/// Streams are shared between the writer thread and background transmission
/// threads, so `write` takes `&self`; implementations needing mutable state
/// keep it behind their own lock.
///
/// # Example
///
/// ```
/// use rust_stream_logger::core::{Result, Stream};
///
/// struct Discard;
///
/// impl Stream for Discard {
///     fn write(&self, bytes: &[u8]) -> Result<usize> {
///         Ok(bytes.len())
///     }
///
///     fn name(&self) -> &str {
///         "discard"
///     }
/// }
/// ```
pub trait Stream: Send + Sync {
    /// Write a blob, returning the number of bytes accepted
    fn write(&self, bytes: &[u8]) -> Result<usize>;

    fn name(&self) -> &str;
}

impl<S: Stream + ?Sized> Stream for Arc<S> {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        (**self).write(bytes)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Write to `stream`, turning a panic inside it into [`StreamError::StreamPanicked`]
pub(crate) fn write_isolated(stream: &dyn Stream, bytes: &[u8]) -> Result<usize> {
    match panic::catch_unwind(AssertUnwindSafe(|| stream.write(bytes))) {
        Ok(result) => result,
        Err(panic_info) => {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(StreamError::StreamPanicked {
                stream: stream.name().to_string(),
                message,
            })
        }
    }
}
