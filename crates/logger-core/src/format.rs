//! Wire line formatting
//!
//! Every destination receives the same line:
//!
//! ```text
//! [I] 2024-05-01 12:00:00 [main.rs:42] [BSC] hello {"a":18446744073709551615}
//! ```
//!
//! The field map is rendered as compact JSON with sorted keys and is omitted
//! entirely when empty.

use crate::{Level, LogEvent};
use std::fmt::Write;
use std::path::Path;

/// Placeholder file name for events that arrive without a call site.
pub const RELAY_FILE: &str = "pipe.writer";

/// `chrono` format used for line timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats log events into newline-terminated lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter;

impl Formatter {
    /// Create a formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Level the event is rendered at.
    ///
    /// Events without provenance are raised to at least `Warn`.
    #[must_use]
    pub fn effective_level(event: &LogEvent) -> Level {
        match event.call_site {
            Some(_) => event.level,
            None => event.level.max(Level::Warn),
        }
    }

    /// Render the event as a single line.
    #[must_use]
    pub fn format(&self, event: &LogEvent) -> Vec<u8> {
        let mut line = String::with_capacity(64 + event.message.len());

        let (file, line_no) = match event.call_site {
            Some(site) => (base_name(site.file), site.line),
            None => (RELAY_FILE, 0),
        };

        let _ = write!(
            line,
            "[{}] {} [{}:{}] ",
            Self::effective_level(event).label(),
            event.timestamp.format(TIMESTAMP_FORMAT),
            file,
            line_no
        );

        if let Some(tag) = event.tag.as_deref().filter(|t| !t.is_empty()) {
            let _ = write!(line, "[{tag}] ");
        }
        line.push_str(&event.message);

        if !event.fields.is_empty() {
            // A map of `Value`s always serializes.
            if let Ok(fields) = serde_json::to_string(&event.fields) {
                line.push(' ');
                line.push_str(&fields);
            }
        }

        line.push('\n');
        line.into_bytes()
    }
}

fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallSite, UNSUPPORTED_VALUE};
    use chrono::{Local, TimeZone};
    use std::collections::HashMap;

    fn fixed_event(level: Level, message: &str) -> LogEvent {
        let timestamp = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        LogEvent::new(level, message)
            .with_timestamp(timestamp)
            .with_call_site(CallSite::new("src/bin/server.rs", 42))
    }

    fn render(event: &LogEvent) -> String {
        String::from_utf8(Formatter::new().format(event)).unwrap()
    }

    #[test]
    fn test_line_shape() {
        let line = render(&fixed_event(Level::Info, "hello"));
        assert_eq!(line, "[I] 2024-05-01 12:30:05 [server.rs:42] hello\n");
    }

    #[test]
    fn test_empty_fields_leave_no_markup() {
        let line = render(&fixed_event(Level::Error, "boom"));
        assert!(line.ends_with("boom\n"));
        assert!(!line.contains("{}"));
        assert!(!line.contains("[]"));
    }

    #[test]
    fn test_tag_and_large_integer_field() {
        let event = fixed_event(Level::Info, "hello")
            .with_tag("BSC")
            .with_field("a", 18_446_744_073_709_551_615_u64);
        let line = render(&event);

        assert!(line.contains("] [BSC] hello {"), "{line}");
        assert!(line.ends_with("{\"a\":18446744073709551615}\n"), "{line}");
    }

    #[test]
    fn test_fields_sorted_by_key() {
        let event = fixed_event(Level::Info, "hello")
            .with_field("zeta", 1)
            .with_field("alpha", "x");
        let line = render(&event);

        assert!(line.ends_with("hello {\"alpha\":\"x\",\"zeta\":1}\n"), "{line}");
    }

    #[test]
    fn test_missing_call_site_degrades_provenance() {
        let event = LogEvent::new(Level::Info, "from a pipe");
        let line = render(&event);

        assert!(line.starts_with("[W] "), "{line}");
        assert!(line.contains("[pipe.writer:0] from a pipe"), "{line}");
        assert_eq!(Formatter::effective_level(&event), Level::Warn);

        // Already above warn: left alone.
        let event = LogEvent::new(Level::Error, "from a pipe");
        assert_eq!(Formatter::effective_level(&event), Level::Error);
    }

    #[test]
    fn test_unsupported_field_renders_sentinel() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 2);
        let event = fixed_event(Level::Info, "hello").with_field("bad", &bad);
        let line = render(&event);

        assert!(line.contains(&format!("\"bad\":\"{UNSUPPORTED_VALUE}\"")), "{line}");
    }
}
