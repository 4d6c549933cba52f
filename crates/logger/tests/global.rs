//! Process-wide logger and macros
//!
//! Kept in its own test binary so nothing else touches the global.

use fanlog::test_support::SharedBuffer;
use fanlog::{ConsoleDestination, Error, Logger, LoggerConfig};
use termcolor::NoColor;

#[test]
fn test_global_initializes_once() {
    let logger = Logger::with_config(LoggerConfig {
        console: false,
        ..LoggerConfig::default()
    })
    .expect("Failed to create logger");
    let buffer = SharedBuffer::new();
    logger.set_console(ConsoleDestination::new(NoColor::new(buffer.clone())));

    let installed = fanlog::init_global(logger).expect("Failed to install global logger");
    assert!(std::ptr::eq(installed, fanlog::global()));

    let again = fanlog::init_global(Logger::new());
    assert!(matches!(again, Err(Error::AlreadyInitialized)));

    let peers = 3;
    fanlog::info!("{peers} peers connected");
    fanlog::error!("lost {}", "peer");
    fanlog::trace!("below the default level");

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[I] "));
    assert!(lines[0].contains("[global.rs:"), "{}", lines[0]);
    assert!(lines[0].ends_with("3 peers connected"));
    assert!(lines[1].ends_with("lost peer"));
}
