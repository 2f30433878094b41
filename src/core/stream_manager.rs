//! Per-level stream registry

use super::{
    error::{Result, StreamError},
    log_level::LogLevel,
    log_message::LogMessage,
    stream::{write_isolated, Stream},
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Routes serialized log messages to the streams registered for each level
///
/// A stream can be registered under several levels; it then receives every
/// message of each of those levels.
#[derive(Default)]
pub struct StreamManager {
    streams: RwLock<HashMap<LogLevel, Vec<Arc<dyn Stream>>>>,
}

impl StreamManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, level: LogLevel, stream: Arc<dyn Stream>) {
        self.streams.write().entry(level).or_default().push(stream);
    }

    /// Register a stream under a textual level name, e.g. `"warning"`
    pub fn register_named(&self, level: &str, stream: Arc<dyn Stream>) -> Result<()> {
        let level = level.parse::<LogLevel>()?;
        self.register(level, stream);
        Ok(())
    }

    /// Number of streams registered for `level`
    pub fn stream_count(&self, level: LogLevel) -> usize {
        self.streams.read().get(&level).map_or(0, Vec::len)
    }

    /// Serialize `message` once and write it to every stream of `level`.
    ///
    /// A failing stream does not stop delivery to the others. Levels with no
    /// streams succeed without doing anything.
    pub fn send(&self, level: LogLevel, message: &LogMessage) -> Result<()> {
        let payload = message.serialize()?;
        self.send_bytes(level, payload.as_bytes())
    }

    /// Like [`send`](Self::send), resolving the level from its name first
    pub fn send_named(&self, level: &str, message: &LogMessage) -> Result<()> {
        let level = level.parse::<LogLevel>()?;
        self.send(level, message)
    }

    /// Write an already serialized payload to every stream of `level`
    pub fn send_bytes(&self, level: LogLevel, payload: &[u8]) -> Result<()> {
        // Snapshot so a slow stream never blocks registration
        let targets = match self.streams.read().get(&level) {
            Some(streams) => streams.clone(),
            None => return Ok(()),
        };

        let mut failed = 0;
        for (idx, stream) in targets.iter().enumerate() {
            if let Err(e) = write_isolated(stream.as_ref(), payload) {
                eprintln!(
                    "[STREAM ERROR] {} stream #{} ({}) failed: {}",
                    level.label(),
                    idx,
                    stream.name(),
                    e
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(StreamError::Dispatch {
                level: level.label().to_string(),
                failed,
                total: targets.len(),
            });
        }
        Ok(())
    }
}
