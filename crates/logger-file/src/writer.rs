//! Rotating file writer

use crate::{Clock, Error, FilePattern, Result, RotationConfig, SystemClock};
use chrono::{DateTime, TimeDelta, Utc};
use fanlog_core::{Destination, Line};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The file for the bucket currently being written.
#[derive(Debug)]
struct ActiveFile {
    bucket_start: DateTime<Utc>,
    path: PathBuf,
    file: File,
}

/// Writes log output into one file per time bucket.
///
/// The writer does no locking of its own: callers must ensure a single
/// write or rotation is in flight at a time.
///
/// Nothing touches the disk until the first write. A write opens the file for
/// the current bucket when none is open or the bucket has ended, repoints the
/// link at it, sweeps files past the retention window, then appends the bytes.
#[derive(Debug)]
pub struct RotatingFileWriter {
    config: RotationConfig,
    pattern: FilePattern,
    clock: Arc<dyn Clock>,
    active: Option<ActiveFile>,
}

impl RotatingFileWriter {
    /// Create a writer for `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the configuration is invalid.
    pub fn new(config: RotationConfig) -> Result<Self> {
        let pattern = config.validate()?;
        Ok(Self {
            config,
            pattern,
            clock: Arc::new(SystemClock),
            active: None,
        })
    }

    /// Builder-style method for replacing the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Path of the file currently open, if any
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    /// Path of the link to the newest file
    #[must_use]
    pub fn link_path(&self) -> PathBuf {
        self.config.link_path()
    }

    /// Whether a bucket file is currently open
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Change the bucket length and retention window.
    ///
    /// Takes effect on the next write; the open file is kept until its
    /// bucket, measured with the new period, has elapsed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` and keeps the old settings if the new
    /// ones are invalid.
    pub fn reconfigure(&mut self, period: Duration, retention: Duration) -> Result<()> {
        let mut config = self.config.clone();
        config.period = period;
        config.retention = retention;

        self.pattern = config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Flush and close the open file. The next write opens a new one.
    ///
    /// # Errors
    ///
    /// Returns the error from the final flush.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut active) = self.active.take() {
            active.file.flush()?;
            debug!("Closed log file {}", active.path.display());
        }
        Ok(())
    }

    fn bucket_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let period_ms = i64::try_from(self.config.period.as_millis())
            .unwrap_or(i64::MAX)
            .max(1);
        let ms = now.timestamp_millis();
        DateTime::from_timestamp_millis(ms - ms.rem_euclid(period_ms)).unwrap_or(now)
    }

    fn needs_rotation(&self, now: DateTime<Utc>) -> bool {
        let Some(active) = &self.active else {
            return true;
        };
        (now - active.bucket_start)
            .to_std()
            .map_or(true, |elapsed| elapsed >= self.config.period)
    }

    /// Open the file for the bucket containing `now`
    fn rotate(&mut self, now: DateTime<Utc>) -> Result<()> {
        // Close existing file if any
        if let Some(mut previous) = self.active.take() {
            if let Err(e) = previous.file.flush() {
                warn!("Failed to flush {}: {}", previous.path.display(), e);
            }
        }

        let directory = &self.config.directory;
        fs::create_dir_all(directory).map_err(|source| Error::CreateDirectory {
            path: directory.clone(),
            source,
        })?;

        let bucket_start = self.bucket_start(now);
        let path = directory.join(self.pattern.render(bucket_start));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::OpenFile {
                path: path.clone(),
                source,
            })?;

        // A stale link is not worth losing the record over.
        if let Err(e) = self.update_link(&path) {
            warn!("{}", e);
        }

        debug!("Rotated log file -> {}", path.display());

        self.active = Some(ActiveFile {
            bucket_start,
            path,
            file,
        });

        self.sweep(now);
        Ok(())
    }

    /// Point the link at `target`
    fn update_link(&self, target: &Path) -> Result<()> {
        let link = self.link_path();

        #[cfg(unix)]
        {
            let Some(name) = target.file_name() else {
                return Ok(());
            };

            // Stage the new symlink, then rename it over the old one so the
            // link never dangles.
            let staging = self
                .config
                .directory
                .join(format!(".{}.tmp", self.config.link_name));
            let _ = fs::remove_file(&staging);

            std::os::unix::fs::symlink(name, &staging).map_err(|source| Error::Link {
                path: link.clone(),
                source,
            })?;
            fs::rename(&staging, &link).map_err(|source| Error::Link {
                path: link.clone(),
                source,
            })?;
        }

        #[cfg(not(unix))]
        {
            match fs::remove_file(&link) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(Error::Link { path: link, source }),
            }
            fs::hard_link(target, &link).map_err(|source| Error::Link {
                path: link.clone(),
                source,
            })?;
        }

        debug!("Updated link: {} -> {}", link.display(), target.display());
        Ok(())
    }

    /// Latest instant a bucket written to the file named for `name_start`
    /// can end.
    ///
    /// The name only records the pattern's finest field, so any bucket that
    /// began before the next name may have written to it.
    fn last_bucket_end(
        &self,
        name_start: DateTime<Utc>,
        period: TimeDelta,
    ) -> Option<DateTime<Utc>> {
        let last_instant = self
            .pattern
            .name_end(name_start)?
            .checked_sub_signed(TimeDelta::milliseconds(1))?;
        self.bucket_start(last_instant).checked_add_signed(period)
    }

    /// Delete bucket files whose last bucket ended before the retention window
    fn sweep(&self, now: DateTime<Utc>) {
        let (Ok(period), Ok(retention)) = (
            TimeDelta::from_std(self.config.period),
            TimeDelta::from_std(self.config.retention),
        ) else {
            return;
        };
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return;
        };

        let entries = match fs::read_dir(&self.config.directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to list {} for retention: {}",
                    self.config.directory.display(),
                    e
                );
                return;
            }
        };

        let current = self.current_path();

        for entry in entries.flatten() {
            let path = entry.path();
            if current == Some(path.as_path()) {
                continue;
            }
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }

            let Some(name_start) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| self.pattern.parse(name))
            else {
                continue;
            };

            let expired = self
                .last_bucket_end(name_start, period)
                .is_some_and(|bucket_end| bucket_end < cutoff);
            if !expired {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed expired log file {}", path.display()),
                Err(e) => warn!("Failed to remove expired log file {}: {}", path.display(), e),
            }
        }
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.clock.now();
        if self.needs_rotation(now) {
            self.rotate(now)?;
        }

        let active = self
            .active
            .as_mut()
            .ok_or_else(|| io::Error::other("no log file open"))?;
        active.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(active) = self.active.as_mut() {
            active.file.flush()?;
        }
        Ok(())
    }
}

impl Destination for RotatingFileWriter {
    fn write(&mut self, line: &Line<'_>) -> io::Result<usize> {
        Write::write(self, line.bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    fn close(&mut self) -> io::Result<()> {
        RotatingFileWriter::close(self).map_err(io::Error::from)
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close log file: {}", e);
        }
    }
}
