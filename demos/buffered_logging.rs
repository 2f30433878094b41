//! Buffered logging demo
//!
//! Routes log levels to console and file streams, batching the file output
//! through a BufferedStream with a capacity limit.

use rust_stream_logger::prelude::*;
use rust_stream_logger::{debug, error, info, warning};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Buffered Logging Demo ===\n");

    let log_path = std::env::temp_dir().join("rust_stream_logger_demo.log");
    let file = FileStream::new(&log_path)?;

    let buffered = Arc::new(
        BufferedStream::builder()
            .stream(file)
            .capacity_limit(5)
            .build()?,
    );
    let console = Arc::new(ConsoleStream::new());

    let logger = Logger::builder()
        .tag("demo")
        .metadata("component", "buffered_logging")
        .stream(LogLevel::Debug, console.clone())
        .stream(LogLevel::Info, console.clone())
        .stream(LogLevel::Info, buffered.clone())
        .stream(LogLevel::Warning, buffered.clone())
        .stream(LogLevel::Error, Arc::new(ConsoleStream::for_level(LogLevel::Error)))
        .stream(LogLevel::Error, buffered.clone())
        .build();

    debug!(logger, "Debug output goes to the console only");
    for i in 0..12 {
        info!(logger, "Processing item {}", i);
    }
    warning!(logger, "Queue depth above {}", 10);
    error!(logger, "Failed to reach {}", "upstream");

    println!("\nPending in buffer: {}", buffered.fill_count());
    let flushed = buffered.flush_now()?;
    println!("Flushed {} remaining entries", flushed);

    let metrics = buffered.metrics();
    println!(
        "Buffered {} entries, {} capacity flushes, {} transmissions",
        metrics.entries_buffered(),
        metrics.capacity_flushes(),
        metrics.transmissions()
    );
    println!("Log file: {}", log_path.display());

    Ok(())
}
