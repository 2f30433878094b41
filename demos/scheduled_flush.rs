//! Scheduled flush demo
//!
//! Shows the autonomous routine flushing on a fixed interval, a stop and
//! restart, and a failing target reported through the fatal callback.

use rust_stream_logger::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Scheduled Flush Demo ===\n");

    let buffered = BufferedStream::builder()
        .stream(ConsoleStream::new())
        .flush_interval(Duration::from_millis(200))
        .autostart(true)
        .build()?;

    println!("Writing three entries, flushed together on the next tick:");
    buffered.write_entry("tick entry one");
    buffered.write_entry("tick entry two");
    buffered.write_entry("tick entry three");
    thread::sleep(Duration::from_millis(300));

    println!("\nStopping the routine; new entries stay pending");
    buffered.stop_autonomous_transmission();
    buffered.write_entry("held while stopped");
    thread::sleep(Duration::from_millis(300));
    println!("Pending after stop: {}", buffered.fill_count());

    println!("\nRestarting with a shorter interval:");
    buffered.set_scheduling_interval(Duration::from_millis(50), true)?;
    thread::sleep(Duration::from_millis(150));
    buffered.stop_autonomous_transmission();

    println!("\nFailing target:");
    let failing = Arc::new(MemoryStream::failing());
    let fatal: FatalCallback = Arc::new(|err: StreamError| {
        eprintln!("[STREAM FATAL] demo callback: {}", err);
    });
    let broken = BufferedStream::builder()
        .shared_stream(failing.clone())
        .flush_interval(Duration::from_millis(50))
        .on_fatal(fatal)
        .autostart(true)
        .build()?;
    broken.write_entry("this entry is lost");
    thread::sleep(Duration::from_millis(150));
    println!("Routine running after failure: {}", broken.is_routine_running());

    // A supervisor may restart once the target recovers
    failing.set_failing(false);
    broken.start_autonomous_transmission()?;
    broken.write_entry("delivered after restart");
    thread::sleep(Duration::from_millis(150));
    println!("Blobs delivered after restart: {}", failing.write_count());

    Ok(())
}
