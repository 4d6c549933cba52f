//! Streaming subscriber destination

use fanlog_core::{Connection, Destination, Line};
use std::io;

/// Forwards lines to a single subscriber connection.
///
/// The connection is closed when the destination is dropped, which happens
/// after a failed send or when another connection replaces it.
pub struct NetworkDestination {
    connection: Box<dyn Connection>,
}

impl NetworkDestination {
    /// Wrap a subscriber connection.
    pub fn new(connection: Box<dyn Connection>) -> Self {
        Self { connection }
    }
}

impl Destination for NetworkDestination {
    fn write(&mut self, line: &Line<'_>) -> io::Result<usize> {
        self.connection.send(line.bytes)?;
        Ok(line.bytes.len())
    }
}

impl Drop for NetworkDestination {
    fn drop(&mut self) {
        self.connection.close();
    }
}
