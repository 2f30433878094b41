//! Stress tests for concurrent buffered writes
//!
//! These tests verify:
//! - No entry is lost or duplicated under concurrent writers
//! - Capacity flushes keep up with heavy write volume
//! - The autonomous routine and writers share the buffer safely
//! - Routine start/stop cycles never leave two routines flushing

use rust_stream_logger::core::buffered_stream::BufferedStream;
use rust_stream_logger::core::log_level::LogLevel;
use rust_stream_logger::core::logger::Logger;
use rust_stream_logger::streams::memory::MemoryStream;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const THREADS: usize = 8;
const WRITES_PER_THREAD: usize = 500;

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn delivered_entries(sink: &MemoryStream) -> Vec<String> {
    sink.writes()
        .iter()
        .flat_map(|blob| {
            String::from_utf8_lossy(blob)
                .split('\n')
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn spawn_writers(buffered: &Arc<BufferedStream>) -> Vec<thread::JoinHandle<()>> {
    (0..THREADS)
        .map(|t| {
            let buffered = Arc::clone(buffered);
            thread::spawn(move || {
                for i in 0..WRITES_PER_THREAD {
                    buffered.write_entry(format!("t{}-{}", t, i));
                }
            })
        })
        .collect()
}

/// Without a limit every write stays pending
#[test]
fn test_concurrent_writes_without_limit() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = Arc::new(BufferedStream::new(Arc::clone(&sink)));

    for handle in spawn_writers(&buffered) {
        handle.join().expect("writer panicked");
    }

    assert_eq!(buffered.fill_count(), THREADS * WRITES_PER_THREAD);
    assert_eq!(sink.write_count(), 0);
}

/// With a limit every entry reaches the sink exactly once
#[test]
fn test_concurrent_writes_with_limit() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = Arc::new(
        BufferedStream::builder()
            .shared_stream(sink.clone())
            .capacity_limit(37)
            .build()
            .unwrap(),
    );

    for handle in spawn_writers(&buffered) {
        handle.join().expect("writer panicked");
    }

    let total = THREADS * WRITES_PER_THREAD;
    let pending = buffered.fill_count();
    assert!(pending <= 37, "pending {} exceeds the limit", pending);

    let expected_transmissions = buffered.metrics().capacity_flushes();
    assert!(wait_until(Duration::from_secs(5), || {
        buffered.metrics().transmissions() == expected_transmissions
    }));
    buffered.flush_now().unwrap();

    let delivered = delivered_entries(&sink);
    assert_eq!(delivered.len(), total);

    let unique: HashSet<_> = delivered.iter().collect();
    assert_eq!(unique.len(), total, "an entry was delivered twice");
    assert_eq!(buffered.metrics().entries_transmitted(), total as u64);
}

/// Writers racing the autonomous routine
#[test]
fn test_concurrent_writes_with_routine() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = Arc::new(
        BufferedStream::builder()
            .shared_stream(sink.clone())
            .capacity_limit(64)
            .flush_interval(Duration::from_millis(2))
            .autostart(true)
            .build()
            .unwrap(),
    );

    for handle in spawn_writers(&buffered) {
        handle.join().expect("writer panicked");
    }
    buffered.stop_autonomous_transmission();

    // The routine may still hold one generation it took before the stop
    thread::sleep(Duration::from_millis(20));
    buffered.flush_now().unwrap();

    let total = THREADS * WRITES_PER_THREAD;
    assert!(wait_until(Duration::from_secs(5), || {
        delivered_entries(&sink).len() >= total
    }));

    let delivered = delivered_entries(&sink);
    let unique: HashSet<_> = delivered.iter().collect();
    assert_eq!(delivered.len(), total);
    assert_eq!(unique.len(), total);
}

/// Each writer's entries keep their relative order inside a blob
#[test]
fn test_per_thread_order_preserved_within_blobs() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = Arc::new(BufferedStream::new(Arc::clone(&sink)));

    for handle in spawn_writers(&buffered) {
        handle.join().expect("writer panicked");
    }
    buffered.flush_now().unwrap();

    let delivered = delivered_entries(&sink);
    for t in 0..THREADS {
        let prefix = format!("t{}-", t);
        let indices: Vec<usize> = delivered
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(indices, (0..WRITES_PER_THREAD).collect::<Vec<_>>());
    }
}

/// Rapid start/stop cycles end with at most one live routine
#[test]
fn test_routine_restart_cycles() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = BufferedStream::new(Arc::clone(&sink));
    buffered
        .set_scheduling_interval(Duration::from_millis(5), false)
        .unwrap();

    for _ in 0..50 {
        buffered.start_autonomous_transmission().unwrap();
        assert!(buffered.start_autonomous_transmission().is_err());
        buffered.stop_autonomous_transmission();
    }
    buffered.start_autonomous_transmission().unwrap();

    for i in 0..20 {
        buffered.write_entry(format!("entry {}", i));
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(50));
    buffered.stop_autonomous_transmission();

    let delivered = delivered_entries(&sink);
    assert_eq!(delivered.len(), 20);
    assert_eq!(buffered.fill_count(), 0);
}

/// Logger fan-out from many threads into one buffered sink
#[test]
fn test_logger_concurrent_fan_out() {
    let sink = Arc::new(MemoryStream::new());
    let buffered = Arc::new(
        BufferedStream::builder()
            .shared_stream(sink.clone())
            .capacity_limit(50)
            .build()
            .unwrap(),
    );
    let logger = Arc::new(
        Logger::builder()
            .tag("stress")
            .stream(LogLevel::Info, buffered.clone())
            .stream(LogLevel::Warning, buffered.clone())
            .build(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..100 {
                    if i % 2 == 0 {
                        logger.info(format!("info {} {}", t, i));
                    } else {
                        logger.warning(format!("warning {} {}", t, i));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("logger thread panicked");
    }

    let expected_transmissions = buffered.metrics().capacity_flushes();
    assert!(wait_until(Duration::from_secs(5), || {
        buffered.metrics().transmissions() == expected_transmissions
    }));
    buffered.flush_now().unwrap();

    assert_eq!(delivered_entries(&sink).len(), THREADS * 100);
}
