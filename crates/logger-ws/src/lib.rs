//! Live log streaming over websockets
//!
//! Serves `GET /log`; the most recent websocket client receives every line
//! the logger writes, as one text frame per line without the trailing
//! newline. A new client replaces the old one.
//!
//! - [`router`]: mount the endpoint into an existing axum server
//! - [`LogStreamServer`]: run it standalone, by default on port 6564

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod connection;
mod error;
mod server;

pub use connection::{DEFAULT_QUEUE_CAPACITY, Forwarder, WebSocketConnection};
pub use error::{Error, Result};
pub use server::{DEFAULT_LISTEN_ADDR, DEFAULT_PORT, LOG_PATH, LogStreamServer, router};
