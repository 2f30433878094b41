//! Core buffering engine, stream trait and logger types

pub mod buffer;
pub mod buffered_stream;
pub mod config;
pub mod error;
pub mod flatten;
pub mod log_level;
pub mod log_message;
pub mod logger;
pub mod metrics;
pub mod stream;
pub mod stream_manager;

pub use buffer::{Buffer, DEFAULT_BASE_CAPACITY};
pub use buffered_stream::{BufferedStream, BufferedStreamBuilder};
pub use config::{
    default_fatal_callback, BufferedStreamConfig, FatalCallback, DEFAULT_SEPARATOR,
    MIN_FLUSH_INTERVAL,
};
pub use error::{Result, StreamError};
pub use flatten::flatten;
pub use log_level::LogLevel;
pub use log_message::LogMessage;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::{FlushTrigger, StreamMetrics};
pub use stream::Stream;
pub use stream_manager::StreamManager;
