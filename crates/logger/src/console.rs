//! Colored console output

use crate::BuildMode;
use fanlog_core::{Destination, Line};
use std::fmt;
use std::io::{self, Write};
use termcolor::{StandardStream, WriteColor};

/// Console destination.
///
/// Lines carrying a style are colored up to, but not including, the trailing
/// newline so the reset lands before the line break.
pub struct ConsoleDestination {
    out: Box<dyn WriteColor + Send>,
}

impl ConsoleDestination {
    /// Write to any color-capable stream.
    pub fn new<W: WriteColor + Send + 'static>(out: W) -> Self {
        Self { out: Box::new(out) }
    }

    /// Write to standard output with the color policy of `mode`.
    #[must_use]
    pub fn stdout(mode: BuildMode) -> Self {
        Self::new(StandardStream::stdout(mode.color_choice()))
    }
}

impl fmt::Debug for ConsoleDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleDestination")
            .field("color", &self.out.supports_color())
            .finish()
    }
}

impl Destination for ConsoleDestination {
    fn write(&mut self, line: &Line<'_>) -> io::Result<usize> {
        match line.style {
            Some(style) if self.out.supports_color() => {
                let (body, newline) = match line.bytes.strip_suffix(b"\n") {
                    Some(body) => (body, true),
                    None => (line.bytes, false),
                };

                self.out.set_color(style)?;
                self.out.write_all(body)?;
                self.out.reset()?;
                if newline {
                    self.out.write_all(b"\n")?;
                }
            }
            _ => self.out.write_all(line.bytes)?,
        }
        Ok(line.bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuffer;
    use fanlog_core::{Level, LevelColors};
    use termcolor::{Ansi, NoColor};

    #[test]
    fn test_plain_output_is_verbatim() {
        let buffer = SharedBuffer::new();
        let mut console = ConsoleDestination::new(NoColor::new(buffer.clone()));
        let colors = LevelColors::default();

        let bytes = b"[I] hello\n";
        let line = Line::new(Level::Info, bytes).with_style(colors.get(Level::Info));
        assert_eq!(console.write(&line).unwrap(), bytes.len());
        assert_eq!(buffer.contents(), "[I] hello\n");
    }

    #[test]
    fn test_reset_precedes_newline() {
        let buffer = SharedBuffer::new();
        let mut console = ConsoleDestination::new(Ansi::new(buffer.clone()));
        let colors = LevelColors::default();

        let line = Line::new(Level::Error, b"[E] boom\n").with_style(colors.get(Level::Error));
        console.write(&line).unwrap();

        let out = buffer.contents();
        assert!(out.starts_with("\x1b["), "{out:?}");
        assert!(out.ends_with("[E] boom\x1b[0m\n"), "{out:?}");
    }
}
