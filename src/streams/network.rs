//! Network stream for remote logging
//!
//! Sends blobs to a remote server over TCP, one newline-terminated frame per
//! write. Pair it with a `BufferedStream` to batch many log lines into one
//! round trip.

use crate::core::{Result, Stream, StreamError};
use parking_lot::Mutex;
use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Network stream that sends blobs to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use rust_stream_logger::core::BufferedStream;
/// use rust_stream_logger::streams::NetworkStream;
///
/// let network = NetworkStream::new("127.0.0.1:8080")
///     .expect("Failed to connect to log server");
/// let buffered = BufferedStream::new(network);
/// buffered.set_buffer_limit(100);
/// ```
pub struct NetworkStream {
    connection: Mutex<Option<TcpStream>>,
    address: String,
    reconnect_on_error: bool,
}

impl NetworkStream {
    /// Connect to `addr` (e.g. "localhost:8080")
    ///
    /// # Errors
    ///
    /// Returns error if connection fails
    pub fn new(addr: impl ToString) -> Result<Self> {
        let address = addr.to_string();
        let connection = Self::connect(&address)?;

        Ok(Self {
            connection: Mutex::new(Some(connection)),
            address,
            reconnect_on_error: true,
        })
    }

    /// Enable or disable one reconnect-and-resend attempt after a failed write
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(address: &str) -> Result<TcpStream> {
        let connection = TcpStream::connect(address)?;
        connection.set_write_timeout(Some(IO_TIMEOUT))?;
        connection.set_read_timeout(Some(IO_TIMEOUT))?;
        connection.set_nodelay(true)?;
        Ok(connection)
    }

    fn send(connection: &mut TcpStream, frame: &[u8]) -> std::io::Result<()> {
        connection.write_all(frame)?;
        connection.flush()
    }
}

impl Stream for NetworkStream {
    fn write(&self, bytes: &[u8]) -> Result<usize> {
        let mut frame = Vec::with_capacity(bytes.len() + 1);
        frame.extend_from_slice(bytes);
        frame.push(b'\n');

        let mut connection = self.connection.lock();

        let first_error = match connection.as_mut() {
            Some(conn) => match Self::send(conn, &frame) {
                Ok(()) => return Ok(bytes.len()),
                Err(e) => e.to_string(),
            },
            None => "not connected".to_string(),
        };

        // Connection lost
        *connection = None;
        if !self.reconnect_on_error {
            return Err(StreamError::writer(format!(
                "Network stream to {} failed: {}",
                self.address, first_error
            )));
        }

        let mut conn = Self::connect(&self.address).map_err(|reconnect_err| {
            StreamError::writer(format!(
                "Failed to send log and reconnect: {} (reconnect: {})",
                first_error, reconnect_err
            ))
        })?;
        Self::send(&mut conn, &frame)?;
        *connection = Some(conn);
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        "network"
    }
}
