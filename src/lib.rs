//! # Rust Stream Logger
//!
//! Stream-based logging with a buffering dispatcher.
//!
//! ## Features
//!
//! - **Buffered Streams**: entries are batched in memory and flushed as one
//!   blob when a count limit is reached or on a fixed schedule
//! - **Non-blocking Writes**: writers never wait on a slow or failing sink
//! - **Per-level Routing**: each log level fans out to its own streams
//! - **Multiple Streams**: console, file, TCP, HTTP webhook and in-memory targets

pub mod core;
pub mod macros;
pub mod streams;

pub mod prelude {
    pub use crate::core::{
        flatten, BufferedStream, BufferedStreamBuilder, BufferedStreamConfig, FatalCallback,
        FlushTrigger, LogLevel, LogMessage, Logger, LoggerBuilder, Result, Stream, StreamError,
        StreamManager, StreamMetrics, DEFAULT_BASE_CAPACITY, DEFAULT_SEPARATOR,
    };
    #[cfg(feature = "console")]
    pub use crate::streams::ConsoleStream;
    #[cfg(feature = "file")]
    pub use crate::streams::FileStream;
    #[cfg(feature = "http")]
    pub use crate::streams::HttpStream;
    pub use crate::streams::MemoryStream;
}

pub use crate::core::{
    flatten, BufferedStream, BufferedStreamBuilder, BufferedStreamConfig, FatalCallback,
    FlushTrigger, LogLevel, LogMessage, Logger, LoggerBuilder, Result, Stream, StreamError,
    StreamManager, StreamMetrics, DEFAULT_BASE_CAPACITY, DEFAULT_SEPARATOR,
};
#[cfg(feature = "console")]
pub use streams::ConsoleStream;
#[cfg(feature = "file")]
pub use streams::FileStream;
#[cfg(feature = "http")]
pub use streams::HttpStream;
pub use streams::MemoryStream;
