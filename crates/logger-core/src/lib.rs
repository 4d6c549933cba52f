//! Core types shared by every fanlog crate
//!
//! This crate holds the pieces that carry no I/O of their own:
//! - `Level`: the ordered severity scale and its single-letter labels
//! - `LogEvent`: one structured event, built per logging call
//! - `Formatter`: turns an event into the wire line every destination receives
//! - `Destination` / `Connection`: the capabilities a sink writes through

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod color;
mod destination;
mod event;
mod format;
mod level;

pub use color::LevelColors;
pub use destination::{Connection, Destination, Line};
pub use event::{CallSite, Fields, LogEvent, UNSUPPORTED_VALUE, field_value};
pub use format::{Formatter, RELAY_FILE, TIMESTAMP_FORMAT};
pub use level::{Level, ParseLevelError};

pub use termcolor::{Color, ColorSpec};
