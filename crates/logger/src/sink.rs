//! Fan-out of formatted lines to the enabled destinations

use crate::network::NetworkDestination;
use fanlog_core::{Connection, Destination, Line};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// The destinations a [`FanoutSink`] can hold, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// Terminal output
    Console,
    /// Rotating log files
    File,
    /// Streaming subscriber
    Network,
}

impl DestinationKind {
    /// Every kind, in delivery order
    pub const ALL: [Self; 3] = [Self::Console, Self::File, Self::Network];

    const fn index(self) -> usize {
        match self {
            Self::Console => 0,
            Self::File => 1,
            Self::Network => 2,
        }
    }

    /// A write failure on this kind discards the destination.
    const fn drops_on_failure(self) -> bool {
        matches!(self, Self::Network)
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::File => write!(f, "file"),
            Self::Network => write!(f, "network"),
        }
    }
}

struct Slot {
    kind: DestinationKind,
    /// Only ever true while `destination` holds something.
    enabled: AtomicBool,
    destination: Mutex<Option<Box<dyn Destination>>>,
}

impl Slot {
    fn new(kind: DestinationKind) -> Self {
        Self {
            kind,
            enabled: AtomicBool::new(false),
            destination: Mutex::new(None),
        }
    }
}

/// Delivers each line to every enabled destination, in [`DestinationKind`]
/// order.
///
/// Each destination has its own lock, so a slow destination only delays
/// writers behind it and lines reach any one destination whole and in the
/// order its lock was acquired. A failing destination never stops the others
/// from being tried.
pub struct FanoutSink {
    slots: [Slot; 3],
}

impl FanoutSink {
    /// Create a sink with every destination empty and disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [
                Slot::new(DestinationKind::Console),
                Slot::new(DestinationKind::File),
                Slot::new(DestinationKind::Network),
            ],
        }
    }

    fn slot(&self, kind: DestinationKind) -> &Slot {
        &self.slots[kind.index()]
    }

    /// Install `destination` for `kind` and enable it, returning whatever it
    /// replaced.
    ///
    /// The slot is disabled while the swap happens so no write reaches a
    /// half-replaced destination.
    pub fn install(
        &self,
        kind: DestinationKind,
        destination: Box<dyn Destination>,
    ) -> Option<Box<dyn Destination>> {
        let slot = self.slot(kind);
        slot.enabled.store(false, Ordering::Release);
        let previous = slot.destination.lock().replace(destination);
        slot.enabled.store(true, Ordering::Release);
        debug!("Installed {} destination", kind);
        previous
    }

    /// Swap the destination for `kind` without changing whether it is
    /// enabled, returning the previous one.
    pub fn replace(
        &self,
        kind: DestinationKind,
        destination: Box<dyn Destination>,
    ) -> Option<Box<dyn Destination>> {
        self.slot(kind).destination.lock().replace(destination)
    }

    /// Disable and take the destination for `kind`.
    pub fn remove(&self, kind: DestinationKind) -> Option<Box<dyn Destination>> {
        let slot = self.slot(kind);
        slot.enabled.store(false, Ordering::Release);
        slot.destination.lock().take()
    }

    /// Whether a destination is installed for `kind`, enabled or not.
    #[must_use]
    pub fn is_installed(&self, kind: DestinationKind) -> bool {
        self.slot(kind).destination.lock().is_some()
    }

    /// Enable or disable `kind` without touching its destination.
    ///
    /// Enabling an empty slot does nothing; the return value says whether
    /// the destination is enabled afterwards.
    pub fn set_destination_enabled(&self, kind: DestinationKind, enabled: bool) -> bool {
        let slot = self.slot(kind);
        if !enabled {
            slot.enabled.store(false, Ordering::Release);
            return false;
        }

        let guard = slot.destination.lock();
        let installed = guard.is_some();
        slot.enabled.store(installed, Ordering::Release);
        installed
    }

    /// Replace the subscriber connection, closing the previous one.
    pub fn set_network_connection(&self, connection: Box<dyn Connection>) {
        let destination = NetworkDestination::new(connection);
        // Dropping the previous destination closes its connection.
        drop(self.install(DestinationKind::Network, Box::new(destination)));
    }

    /// Whether `kind` currently receives lines.
    #[must_use]
    pub fn is_enabled(&self, kind: DestinationKind) -> bool {
        self.slot(kind).enabled.load(Ordering::Acquire)
    }

    /// Whether any destination currently receives lines.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.enabled.load(Ordering::Acquire))
    }

    /// Deliver one line.
    ///
    /// Returns the outcome of the last destination tried, or `Ok(0)` when
    /// none is enabled. A failing network destination is disabled and its
    /// connection closed; console and file failures leave the destination in
    /// place for the next line.
    pub fn write(&self, line: &Line<'_>) -> io::Result<usize> {
        let mut result = Ok(0);

        for slot in &self.slots {
            if !slot.enabled.load(Ordering::Acquire) {
                continue;
            }

            let mut guard = slot.destination.lock();
            // Re-checked under the lock: a remove may have won the race.
            if !slot.enabled.load(Ordering::Acquire) {
                continue;
            }
            let Some(destination) = guard.as_mut() else {
                continue;
            };

            result = destination.write(line);

            if let Err(e) = &result {
                if slot.kind.drops_on_failure() {
                    slot.enabled.store(false, Ordering::Release);
                    let failed = guard.take();
                    drop(guard);
                    drop(failed);
                    warn!("Disabled {} destination after write failure: {}", slot.kind, e);
                } else {
                    debug!("Write to {} destination failed: {}", slot.kind, e);
                }
            }
        }

        result
    }

    /// Flush every installed destination, returning the first error.
    pub fn flush(&self) -> io::Result<()> {
        self.for_each_installed(|destination| destination.flush())
    }

    /// Close every installed destination, returning the first error.
    ///
    /// Destinations stay installed and reopen on their next write.
    pub fn close(&self) -> io::Result<()> {
        self.for_each_installed(|destination| destination.close())
    }

    fn for_each_installed(
        &self,
        mut f: impl FnMut(&mut dyn Destination) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut first_error = None;
        for slot in &self.slots {
            if let Some(destination) = slot.destination.lock().as_mut() {
                if let Err(e) = f(&mut **destination) {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Default for FanoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_map();
        for slot in &self.slots {
            list.entry(&slot.kind, &slot.enabled.load(Ordering::Acquire));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CaptureConnection, CaptureDestination};
    use fanlog_core::Level;

    fn line(bytes: &[u8]) -> Line<'_> {
        Line::new(Level::Info, bytes)
    }

    #[test]
    fn test_empty_sink_accepts_nothing() {
        let sink = FanoutSink::new();
        assert!(!sink.any_enabled());
        assert_eq!(sink.write(&line(b"hello\n")).unwrap(), 0);
    }

    #[test]
    fn test_delivers_to_every_enabled_destination() {
        let sink = FanoutSink::new();
        let console = CaptureDestination::new();
        let file = CaptureDestination::new();
        sink.install(DestinationKind::Console, Box::new(console.clone()));
        sink.install(DestinationKind::File, Box::new(file.clone()));

        assert_eq!(sink.write(&line(b"hello\n")).unwrap(), 6);
        assert_eq!(console.lines(), vec!["hello\n"]);
        assert_eq!(file.lines(), vec!["hello\n"]);
    }

    #[test]
    fn test_failing_console_does_not_stop_file() {
        let sink = FanoutSink::new();
        let console = CaptureDestination::new();
        let file = CaptureDestination::new();
        console.set_failing(true);
        sink.install(DestinationKind::Console, Box::new(console.clone()));
        sink.install(DestinationKind::File, Box::new(file.clone()));

        // File is last, so its success is what the caller sees.
        assert_eq!(sink.write(&line(b"hello\n")).unwrap(), 6);
        assert_eq!(file.lines(), vec!["hello\n"]);
        assert!(sink.is_enabled(DestinationKind::Console));
    }

    #[test]
    fn test_result_is_last_attempted_destination() {
        let sink = FanoutSink::new();
        let console = CaptureDestination::new();
        let file = CaptureDestination::new();
        file.set_failing(true);
        sink.install(DestinationKind::Console, Box::new(console.clone()));
        sink.install(DestinationKind::File, Box::new(file.clone()));

        assert!(sink.write(&line(b"hello\n")).is_err());
        assert_eq!(console.lines(), vec!["hello\n"]);
    }

    #[test]
    fn test_network_failure_disables_and_closes() {
        let sink = FanoutSink::new();
        let file = CaptureDestination::new();
        let connection = CaptureConnection::new();
        sink.install(DestinationKind::File, Box::new(file.clone()));
        sink.set_network_connection(Box::new(connection.clone()));
        assert!(sink.is_enabled(DestinationKind::Network));

        connection.set_failing(true);
        assert!(sink.write(&line(b"one\n")).is_err());
        assert!(!sink.is_enabled(DestinationKind::Network));
        assert!(!sink.is_installed(DestinationKind::Network));
        assert!(connection.is_closed());

        // Never retried; file keeps receiving.
        assert_eq!(sink.write(&line(b"two\n")).unwrap(), 4);
        assert_eq!(connection.attempts(), 1);
        assert_eq!(file.lines(), vec!["one\n", "two\n"]);
    }

    #[test]
    fn test_replacing_connection_closes_previous() {
        let sink = FanoutSink::new();
        let first = CaptureConnection::new();
        let second = CaptureConnection::new();

        sink.set_network_connection(Box::new(first.clone()));
        sink.set_network_connection(Box::new(second.clone()));
        sink.write(&line(b"hello\n")).unwrap();

        assert!(first.is_closed());
        assert!(first.sent().is_empty());
        assert_eq!(second.sent(), vec!["hello\n"]);
    }

    #[test]
    fn test_flush_reaches_disabled_destinations_and_reports_failure() {
        let sink = FanoutSink::new();
        let console = CaptureDestination::new();
        let file = CaptureDestination::new();
        sink.install(DestinationKind::Console, Box::new(console.clone()));
        sink.install(DestinationKind::File, Box::new(file.clone()));
        sink.set_destination_enabled(DestinationKind::File, false);

        sink.flush().unwrap();
        assert_eq!(console.flushes(), 1);
        assert_eq!(file.flushes(), 1);

        // A failing console does not stop the file from closing.
        console.set_failing(true);
        assert!(sink.close().is_err());
        assert_eq!(console.flushes(), 2);
        assert_eq!(file.flushes(), 2);
    }

    #[test]
    fn test_enable_requires_destination() {
        let sink = FanoutSink::new();
        assert!(!sink.set_destination_enabled(DestinationKind::File, true));
        assert!(!sink.is_enabled(DestinationKind::File));

        let console = CaptureDestination::new();
        sink.install(DestinationKind::Console, Box::new(console.clone()));
        assert!(!sink.set_destination_enabled(DestinationKind::Console, false));
        sink.write(&line(b"muted\n")).unwrap();
        assert!(console.lines().is_empty());

        assert!(sink.set_destination_enabled(DestinationKind::Console, true));
        sink.write(&line(b"loud\n")).unwrap();
        assert_eq!(console.lines(), vec!["loud\n"]);
    }
}
