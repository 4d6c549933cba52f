//! Log levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Finer-grained than debug
    Trace,
    /// Verbose diagnostics, usually only enabled while debugging
    Debug,
    /// General operational entries
    Info,
    /// Non-critical entries that deserve attention
    Warn,
    /// Errors that should definitely be noted
    Error,
    /// Logged, then the exit function is invoked
    Fatal,
    /// Logged, then the calling thread panics
    Panic,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Self; 7] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Panic,
    ];

    /// Single-letter label written at the start of every line.
    #[must_use]
    pub const fn label(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Fatal => 'F',
            Self::Panic => 'P',
        }
    }

    /// Upper-case name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Panic => "PANIC",
        }
    }

    /// Whether this level ends the process (or thread) once delivered.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fatal | Self::Panic)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "t" => Ok(Self::Trace),
            "debug" | "d" => Ok(Self::Debug),
            "info" | "i" => Ok(Self::Info),
            "warn" | "warning" | "w" => Ok(Self::Warn),
            "error" | "e" => Ok(Self::Error),
            "fatal" | "f" => Ok(Self::Fatal),
            "panic" | "p" => Ok(Self::Panic),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
