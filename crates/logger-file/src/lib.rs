//! Time-bucketed rotating log files
//!
//! This crate provides the file destination of fanlog:
//! - One file per time bucket, named by a `chrono` strftime pattern
//! - A stable link that always points at the newest file
//! - Retention sweeps that remove files older than a configurable window
//! - An injectable [`Clock`] so bucketing can be driven in tests

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod clock;
mod config;
mod error;
mod pattern;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RotationConfig, RotationConfigBuilder};
pub use error::{Error, Result};
pub use pattern::FilePattern;
pub use writer::RotatingFileWriter;
