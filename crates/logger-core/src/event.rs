//! Log event type

use crate::Level;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::Location;

/// Rendered in place of a field value that cannot be represented as JSON.
pub const UNSUPPORTED_VALUE: &str = "<unsupported>";

/// Structured fields attached to an event, keyed by name.
pub type Fields = BTreeMap<String, Value>;

/// Convert any serializable value into a field value.
///
/// Values `serde_json` cannot represent (maps with non-string keys, failing
/// `Serialize` impls) become [`UNSUPPORTED_VALUE`] instead of an error.
pub fn field_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(UNSUPPORTED_VALUE.to_string()))
}

/// Source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file, as reported by the compiler
    pub file: &'static str,
    /// Line number
    pub line: u32,
}

impl CallSite {
    /// Create a call site from its parts.
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the caller, following `#[track_caller]` frames.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }
}

/// A single structured log event.
///
/// Events are built and consumed within one logging call; nothing retains
/// them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Severity
    pub level: Level,
    /// When the event was created
    pub timestamp: DateTime<Local>,
    /// Where the event was logged from, if known
    pub call_site: Option<CallSite>,
    /// The log message
    pub message: String,
    /// Structured fields
    pub fields: Fields,
    /// Short label rendered as a message prefix rather than a field
    pub tag: Option<String>,
}

impl LogEvent {
    /// Create an event stamped with the current time and no call site.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            call_site: None,
            message: message.into(),
            fields: Fields::new(),
            tag: None,
        }
    }

    /// Builder-style method for setting the call site
    #[must_use]
    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    /// Builder-style method for setting the timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder-style method for setting the tag; an empty tag clears it
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = (!tag.is_empty()).then_some(tag);
        self
    }

    /// Builder-style method for adding one field
    #[must_use]
    pub fn with_field<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.fields.insert(key.into(), field_value(&value));
        self
    }

    /// Builder-style method for merging a set of fields
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_tag_is_no_tag() {
        let event = LogEvent::new(Level::Info, "hello").with_tag("");
        assert_eq!(event.tag, None);

        let event = LogEvent::new(Level::Info, "hello").with_tag("BSC");
        assert_eq!(event.tag.as_deref(), Some("BSC"));
    }

    #[test]
    fn test_unsupported_value_becomes_sentinel() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");

        assert_eq!(field_value(&map), Value::String(UNSUPPORTED_VALUE.into()));
        assert_eq!(field_value(&u64::MAX), Value::from(u64::MAX));
    }

    #[test]
    fn test_field_keys_are_unique() {
        let event = LogEvent::new(Level::Info, "hello")
            .with_field("a", 1)
            .with_field("a", 2);

        assert_eq!(event.fields.len(), 1);
        assert_eq!(event.fields["a"], Value::from(2));
    }

    #[test]
    fn test_caller_tracks_this_file() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("event.rs"));
        assert!(site.line > 0);
    }
}
