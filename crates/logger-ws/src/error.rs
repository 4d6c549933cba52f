//! Log stream server errors

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for the log stream server
pub type Result<T> = std::result::Result<T, Error>;

/// Ways starting the log stream server can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// [`crate::LogStreamServer::start`] was called a second time.
    #[error("log stream server is already running")]
    AlreadyStarted,

    /// The listen address could not be bound.
    #[error("failed to bind log stream to {addr}: {source}")]
    Bind {
        /// Address requested
        addr: SocketAddr,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The bound socket could not report its address.
    #[error("failed to read bound log stream address: {0}")]
    LocalAddr(#[source] io::Error),
}
