//! Structured logging to console, rotating files, and a live subscriber
//!
//! `fanlog` formats each event once and fans the line out to:
//! - Console output, colored per level
//! - Time-bucketed log files with a stable link to the newest one
//! - One streaming subscriber connection (see the `fanlog-ws` crate)
//!
//! Every destination can be reconfigured at runtime while other threads
//! keep logging.
//!
//! # Usage
//!
//! ```
//! use fanlog::{Level, Logger, LoggerConfig};
//!
//! let logger = Logger::with_config(LoggerConfig {
//!     level: Level::Info,
//!     console: false,
//!     ..LoggerConfig::default()
//! })
//! .unwrap();
//!
//! logger.info("service started");
//! logger.with_tag("BSC").with_field("a", u64::MAX).info("hello");
//! fanlog::warn!(logger: logger, "{} peers connected", 3);
//! ```

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod config;
mod console;
mod entry;
mod error;
mod global;
mod logger;
mod macros;
mod network;
mod pipe;
mod sink;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{BuildMode, LoggerConfig};
pub use console::ConsoleDestination;
pub use entry::Entry;
pub use error::{Error, Result};
pub use global::{global, init_global};
pub use logger::{ExitFn, FATAL_EXIT_STATUS, Logger};
pub use network::NetworkDestination;
pub use pipe::PipeWriter;
pub use sink::{DestinationKind, FanoutSink};

pub use fanlog_core::{
    CallSite, Color, ColorSpec, Connection, Destination, Fields, Formatter, Level, LevelColors,
    Line, LogEvent,
};
pub use fanlog_file::RotationConfig;
