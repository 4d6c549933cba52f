//! Output capabilities

use crate::Level;
use std::io;
use termcolor::ColorSpec;

/// One formatted record on its way to a destination.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Level the record was rendered at
    pub level: Level,
    /// Console style for the record, if the writer wants one
    pub style: Option<&'a ColorSpec>,
    /// The formatted bytes, newline terminated
    pub bytes: &'a [u8],
}

impl<'a> Line<'a> {
    /// Create an unstyled line.
    pub const fn new(level: Level, bytes: &'a [u8]) -> Self {
        Self {
            level,
            style: None,
            bytes,
        }
    }

    /// Builder-style method for setting the console style
    #[must_use]
    pub const fn with_style(mut self, style: &'a ColorSpec) -> Self {
        self.style = Some(style);
        self
    }
}

/// Something formatted log lines can be written to.
///
/// Implementations are driven by a single writer at a time; the sink that
/// owns them does the serializing.
pub trait Destination: Send {
    /// Write one line, returning the number of bytes accepted.
    fn write(&mut self, line: &Line<'_>) -> io::Result<usize>;

    /// Flush anything buffered.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Release held resources at shutdown. The destination may be written
    /// to again afterwards.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A streaming subscriber connection.
///
/// An error from [`Connection::send`] is terminal: the connection is
/// discarded and never written to again.
pub trait Connection: Send {
    /// Send one formatted line to the subscriber.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Release the connection; called once, after a failed send or a
    /// replacement.
    fn close(&mut self) {}
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn close(&mut self) {
        (**self).close();
    }
}
