//! Entries: a tag and fields bound to a logger

use crate::Logger;
use fanlog_core::{CallSite, Fields, Level, LogEvent, field_value};
use serde::Serialize;

/// A tag and set of fields waiting for a message.
///
/// Entries are cheap to build and can be logged through more than once.
///
/// ```
/// # use fanlog::{Logger, LoggerConfig};
/// # let logger = Logger::with_config(LoggerConfig { console: false, ..Default::default() }).unwrap();
/// let peer = logger.with_tag("p2p").with_field("peer", "10.0.0.7:30303");
/// peer.info("connected");
/// peer.warn("slow handshake");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Entry<'a> {
    logger: &'a Logger,
    tag: Option<String>,
    fields: Fields,
}

impl<'a> Entry<'a> {
    pub(crate) fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            tag: None,
            fields: Fields::new(),
        }
    }

    /// Builder-style method for setting the tag; an empty tag clears it
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.tag = (!tag.is_empty()).then_some(tag);
        self
    }

    /// Builder-style method for adding one field
    pub fn with_field<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.fields.insert(key.into(), field_value(&value));
        self
    }

    /// Builder-style method for merging a set of fields
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Log `message` at `level` with this entry's tag and fields.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.logger.enabled(level) {
            return;
        }

        let mut event = LogEvent::new(level, message)
            .with_call_site(CallSite::caller())
            .with_fields(self.fields.clone());
        event.tag.clone_from(&self.tag);

        // Failures are reported per destination; the facade's level
        // methods have nowhere to return them.
        let _ = self.logger.log(event);
    }

    /// Log an error
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Log a warning
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    /// Log info
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    /// Log debug
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    /// Log trace
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    /// Log a fatal event, then call the logger's exit function
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::Fatal, message);
    }

    /// Log a panic event, then panic
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.log(Level::Panic, message);
    }
}
