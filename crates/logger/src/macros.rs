//! Formatting macros
//!
//! Each macro logs through the process-wide logger, or through an explicit
//! one given as `logger: expr` before the format string.
//!
//! ```
//! # use fanlog::{Logger, LoggerConfig};
//! # let logger = Logger::with_config(LoggerConfig { console: false, ..Default::default() }).unwrap();
//! let height = 42;
//! fanlog::info!(logger: logger, "imported block {height}");
//! ```

/// Log an error
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().error(::std::format!($($arg)+))
    };
}

/// Log a warning
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().warn(::std::format!($($arg)+))
    };
}

/// Log info
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().info(::std::format!($($arg)+))
    };
}

/// Log debug
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().debug(::std::format!($($arg)+))
    };
}

/// Log trace
#[macro_export]
macro_rules! trace {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.trace(::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().trace(::std::format!($($arg)+))
    };
}
