//! Test support utilities
//!
//! In-memory stand-ins for the console, file, and network destinations.
//! Available to this crate's tests and, with the `test-support` feature, to
//! downstream crates.

use fanlog_core::{Connection, Destination, Line};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn injected_failure() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "injected failure")
}

/// A cloneable in-memory byte buffer, usable as a console stream.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Written lines, without their newlines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A destination that records every line and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct CaptureDestination {
    lines: Arc<Mutex<Vec<String>>>,
    flushes: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CaptureDestination {
    /// Create a recording destination
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes and flushes fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Lines received so far, newlines included
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of flushes attempted, failed ones included
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl Destination for CaptureDestination {
    fn write(&mut self, line: &Line<'_>) -> io::Result<usize> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        self.lines
            .lock()
            .push(String::from_utf8_lossy(line.bytes).into_owned());
        Ok(line.bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }
}

/// A subscriber connection that records sends and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct CaptureConnection {
    sent: Arc<Mutex<Vec<String>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl CaptureConnection {
    /// Create a recording connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Lines delivered so far
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Number of sends attempted, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether the owner has closed this connection
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for CaptureConnection {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        self.sent
            .lock()
            .push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
