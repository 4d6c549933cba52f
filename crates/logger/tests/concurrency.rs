//! Reconfiguration racing with logging

use fanlog::test_support::{CaptureConnection, SharedBuffer};
use fanlog::{ConsoleDestination, Level, Logger, LoggerConfig, RotationConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use termcolor::NoColor;

fn logger_in(dir: &std::path::Path) -> (Arc<Logger>, SharedBuffer) {
    let rotation = RotationConfig::builder()
        .directory(dir.join("logs"))
        .period(Duration::from_secs(60))
        .retention(Duration::from_secs(180))
        .build()
        .expect("Failed to build rotation config");

    let logger = Logger::with_config(LoggerConfig {
        console: false,
        level: Level::Trace,
        rotation,
        ..LoggerConfig::default()
    })
    .expect("Failed to create logger");

    let buffer = SharedBuffer::new();
    logger.set_console(ConsoleDestination::new(NoColor::new(buffer.clone())));
    (Arc::new(logger), buffer)
}

#[test]
fn test_rotation_toggling_races_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (logger, buffer) = logger_in(temp_dir.path());
    let done = Arc::new(AtomicBool::new(false));

    let togglers: Vec<_> = [true, false]
        .into_iter()
        .map(|enabled| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    logger
                        .set_rotation_enabled(enabled)
                        .expect("Failed to toggle rotation");
                }
            })
        })
        .collect();

    let writer = {
        let logger = Arc::clone(&logger);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut written = 0usize;
            while !done.load(Ordering::SeqCst) {
                logger.with_field("n", written).info("tick");
                written += 1;
            }
            written
        })
    };

    for toggler in togglers {
        toggler.join().expect("Toggler panicked");
    }
    done.store(true, Ordering::SeqCst);
    let written = writer.join().expect("Writer panicked");

    // Console never stopped, and every line arrived whole.
    let lines = buffer.lines();
    assert_eq!(lines.len(), written);
    for line in &lines {
        assert!(line.starts_with("[I] "), "{line}");
        assert!(line.contains("tick {\"n\":"), "{line}");
    }

    // Still usable in either final state.
    logger
        .set_rotation_enabled(true)
        .expect("Failed to enable rotation");
    assert!(logger.is_rotation_enabled());
    logger.info("after the race");
    logger.flush().expect("Failed to flush");
}

#[test]
fn test_connection_swaps_race_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (logger, buffer) = logger_in(temp_dir.path());
    let connections: Vec<CaptureConnection> = (0..50).map(|_| CaptureConnection::new()).collect();

    let swapper = {
        let logger = Arc::clone(&logger);
        let connections = connections.clone();
        thread::spawn(move || {
            for connection in connections {
                logger.set_network_connection(connection);
                thread::yield_now();
            }
        })
    };

    let writers: Vec<_> = (0..4)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for n in 0..500 {
                    logger.with_field("writer", id).with_field("n", n).debug("line");
                }
            })
        })
        .collect();

    swapper.join().expect("Swapper panicked");
    for writer in writers {
        writer.join().expect("Writer panicked");
    }

    assert_eq!(buffer.lines().len(), 4 * 500);

    // Every connection but the last was closed when replaced; each line went
    // to at most one of them.
    let (last, replaced) = connections.split_last().expect("At least one connection");
    assert!(replaced.iter().all(CaptureConnection::is_closed));
    assert!(!last.is_closed());
    let forwarded: usize = connections.iter().map(|c| c.sent().len()).sum();
    assert!(forwarded <= 4 * 500);
    assert!(logger.is_network_enabled());
}
