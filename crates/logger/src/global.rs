//! Process-wide logger

use crate::{Error, Logger, Result};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger, created with [`Logger::new`] on first use unless
/// [`init_global`] ran first.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::new)
}

/// Install `logger` as the process-wide logger.
///
/// # Errors
///
/// Returns `Error::AlreadyInitialized` if a logger was installed or
/// [`global`] was already called.
pub fn init_global(logger: Logger) -> Result<&'static Logger> {
    GLOBAL.set(logger).map_err(|_| Error::AlreadyInitialized)?;
    Ok(global())
}
