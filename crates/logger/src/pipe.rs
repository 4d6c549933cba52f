//! Line-oriented writer that feeds a logger

use crate::Logger;
use fanlog_core::{Level, LogEvent};
use std::io::{self, Write};
use tracing::debug;

/// An [`io::Write`] that logs each line written to it.
///
/// Lines carry no call site, so they render as `pipe.writer:0` at warn level
/// or above. Fatal and panic levels deliver the line without exiting or
/// panicking. A trailing partial line is logged on flush or drop.
///
/// ```
/// # use fanlog::{Level, Logger, LoggerConfig};
/// # let logger = Logger::with_config(LoggerConfig { console: false, ..Default::default() }).unwrap();
/// use std::io::Write;
///
/// let mut out = logger.writer(Level::Info);
/// writeln!(out, "child process started").unwrap();
/// ```
#[derive(Debug)]
pub struct PipeWriter<'a> {
    logger: &'a Logger,
    level: Level,
    pending: Vec<u8>,
}

impl<'a> PipeWriter<'a> {
    pub(crate) fn new(logger: &'a Logger, level: Level) -> Self {
        Self {
            logger,
            level,
            pending: Vec::new(),
        }
    }

    fn relay(&self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let text = text.strip_suffix('\r').unwrap_or(&text);
        if let Err(e) = self.logger.relay(LogEvent::new(self.level, text)) {
            debug!("Failed to relay piped line: {}", e);
        }
    }

    fn relay_pending(&mut self) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.relay(&line);
        }
    }
}

impl Write for PipeWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            self.relay(&line[..end]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.relay_pending();
        self.logger.flush()
    }
}

impl Drop for PipeWriter<'_> {
    fn drop(&mut self) {
        self.relay_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuffer;
    use crate::{ConsoleDestination, LoggerConfig};
    use termcolor::NoColor;

    fn captured_logger() -> (Logger, SharedBuffer) {
        let logger = Logger::with_config(LoggerConfig {
            console: false,
            ..LoggerConfig::default()
        })
        .expect("Failed to create logger");
        let buffer = SharedBuffer::new();
        logger.set_console(ConsoleDestination::new(NoColor::new(buffer.clone())));
        (logger, buffer)
    }

    #[test]
    fn test_lines_become_warn_events() {
        let (logger, buffer) = captured_logger();
        {
            let mut out = logger.writer(Level::Info);
            out.write_all(b"first\nsec").unwrap();
            out.write_all(b"ond\r\nthird").unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.starts_with("[W] "), "{line}");
            assert!(line.contains(" [pipe.writer:0] "), "{line}");
        }
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
        assert!(lines[2].ends_with("] third"));
    }

    #[test]
    fn test_error_level_is_kept() {
        let (logger, buffer) = captured_logger();
        let mut out = logger.writer(Level::Error);
        writeln!(out, "disk full").unwrap();

        assert!(buffer.contents().starts_with("[E] "));
    }

    #[test]
    fn test_fatal_level_does_not_exit() {
        let (logger, buffer) = captured_logger();
        logger.set_exit_func(|_| panic!("exit function must not run"));

        let mut out = logger.writer(Level::Fatal);
        writeln!(out, "child died").unwrap();

        assert!(buffer.contents().starts_with("[F] "));
    }
}
