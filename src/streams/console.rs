//! Console stream implementation

use crate::core::{LogLevel, Result, Stream};
use colored::{Color, Colorize};
use std::io::Write;

/// Which standard stream a [`ConsoleStream`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Writes each blob to stdout or stderr, followed by a newline
pub struct ConsoleStream {
    target: ConsoleTarget,
    color: Option<Color>,
}

impl ConsoleStream {
    pub fn new() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
            color: None,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
            color: None,
        }
    }

    /// Console stream colored for `level`; Error and Fatal go to stderr
    ///
    /// # Example
    ///
    /// ```
    /// use rust_stream_logger::streams::ConsoleStream;
    /// use rust_stream_logger::LogLevel;
    ///
    /// let errors = ConsoleStream::for_level(LogLevel::Error);
    /// ```
    pub fn for_level(level: LogLevel) -> Self {
        let target = match level {
            LogLevel::Error | LogLevel::Fatal => ConsoleTarget::Stderr,
            _ => ConsoleTarget::Stdout,
        };
        Self {
            target,
            color: Some(level.color_code()),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn render(&self, bytes: &[u8]) -> Vec<u8> {
        match self.color {
            Some(color) => {
                let text = String::from_utf8_lossy(bytes);
                let mut out = text.color(color).to_string().into_bytes();
                out.push(b'\n');
                out
            }
            None => {
                let mut out = Vec::with_capacity(bytes.len() + 1);
                out.extend_from_slice(bytes);
                out.push(b'\n');
                out
            }
        }
    }
}

impl Default for ConsoleStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for ConsoleStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let output = self.render(bytes);

        // Lock once so a blob is never interleaved with other output
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(&output)?;
                out.flush()?;
            }
            ConsoleTarget::Stderr => {
                let mut out = std::io::stderr().lock();
                out.write_all(&output)?;
                out.flush()?;
            }
        }
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        "console"
    }
}
