//! Logger facade: tags, timestamps and routes messages to level streams

use super::{
    error::Result,
    log_level::LogLevel,
    log_message::{timestamp_nanos, LogMessage},
    stream::Stream,
    stream_manager::StreamManager,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Thread safe logger writing JSON messages to per-level streams
///
/// # Example
///
/// ```
/// use rust_stream_logger::prelude::*;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemoryStream::new());
/// let logger = Logger::builder()
///     .tag("billing")
///     .timestamp(false)
///     .stream(LogLevel::Info, sink.clone())
///     .build();
///
/// logger.info("invoice sent");
/// assert_eq!(sink.writes()[0], br#"{"tag":"billing","message":"invoice sent"}"#.to_vec());
/// ```
pub struct Logger {
    tag: String,
    timestamp: bool,
    min_level: RwLock<LogLevel>,
    metadata: RwLock<BTreeMap<String, String>>,
    streams: StreamManager,
}

impl Logger {
    #[must_use]
    pub fn new(tag: impl Into<String>, timestamp: bool) -> Self {
        Self {
            tag: tag.into(),
            timestamp,
            min_level: RwLock::new(LogLevel::Debug),
            metadata: RwLock::new(BTreeMap::new()),
            streams: StreamManager::new(),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Register `stream` to receive messages of `level`
    pub fn register_stream(&self, level: LogLevel, stream: Arc<dyn Stream>) {
        self.streams.register(level, stream);
    }

    pub fn streams(&self) -> &StreamManager {
        &self.streams
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    /// Metadata attached to every message from now on
    pub fn set_metadata(&self, metadata: BTreeMap<String, String>) {
        *self.metadata.write() = metadata;
    }

    pub fn clear_metadata(&self) {
        self.metadata.write().clear();
    }

    fn build_message(&self, message: String) -> LogMessage {
        let timestamp = if self.timestamp {
            timestamp_nanos(Utc::now())
        } else {
            0
        };
        LogMessage::new(self.tag.clone(), timestamp, message)
            .with_metadata(self.metadata.read().clone())
    }

    /// Build the message and send it to the streams of `level`.
    ///
    /// Messages below the minimum level are skipped and count as success.
    pub fn try_log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        if level < *self.min_level.read() {
            return Ok(());
        }
        let message = self.build_message(message.into());
        self.streams.send(level, &message)
    }

    /// Like [`try_log`](Self::try_log), reporting failures on stderr
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        if let Err(e) = self.try_log(level, message.as_str()) {
            eprintln!(
                "[STREAM ERROR] Can't send log `{}` to {} streams: {}",
                message,
                level.label(),
                e
            );
        }
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn verbose(&self, message: impl Into<String>) {
        self.log(LogLevel::Verbose, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Log `message` to the Fatal streams, then panic with it
    pub fn panic(&self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.log(LogLevel::Fatal, message.as_str());
        panic!("{}", message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("", true)
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_stream_logger::prelude::*;
/// use std::sync::Arc;
///
/// let buffered = Arc::new(BufferedStream::new(ConsoleStream::new()));
/// let logger = Logger::builder()
///     .tag("api")
///     .min_level(LogLevel::Info)
///     .metadata("region", "eu-west-1")
///     .stream(LogLevel::Info, buffered.clone())
///     .stream(LogLevel::Error, buffered)
///     .build();
/// ```
pub struct LoggerBuilder {
    tag: String,
    timestamp: bool,
    min_level: LogLevel,
    metadata: BTreeMap<String, String>,
    streams: Vec<(LogLevel, Arc<dyn Stream>)>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            tag: String::new(),
            timestamp: true,
            min_level: LogLevel::Debug,
            metadata: BTreeMap::new(),
            streams: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Stamp messages with the current UTC time (default: on)
    #[must_use = "builder methods return a new value"]
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stream(mut self, level: LogLevel, stream: Arc<dyn Stream>) -> Self {
        self.streams.push((level, stream));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let logger = Logger::new(self.tag, self.timestamp);
        logger.set_min_level(self.min_level);
        logger.set_metadata(self.metadata);
        for (level, stream) in self.streams {
            logger.register_stream(level, stream);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
