//! Rotation configuration

use crate::{Error, FilePattern, Result};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for time-bucketed rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Directory holding the rotated files and the link
    pub directory: PathBuf,
    /// strftime pattern naming each bucket's file
    pub file_pattern: String,
    /// Name of the link that points at the newest file
    pub link_name: String,
    /// Length of one bucket
    pub period: Duration,
    /// How long a file is kept after its bucket ends
    pub retention: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            file_pattern: "%Y%m%d%H%M.log".to_string(),
            link_name: "latest.log".to_string(),
            period: Duration::from_secs(60),
            retention: Duration::from_secs(180),
        }
    }
}

impl RotationConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> RotationConfigBuilder {
        RotationConfigBuilder::default()
    }

    /// Path of the link inside the log directory.
    #[must_use]
    pub fn link_path(&self) -> PathBuf {
        self.directory.join(&self.link_name)
    }

    /// Check the configuration and return its parsed file pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for a zero period or retention, an
    /// invalid pattern, a pattern that yields the same name for two
    /// consecutive buckets, or a link name that collides with the pattern.
    pub fn validate(&self) -> Result<FilePattern> {
        if self.period.is_zero() {
            return Err(Error::Configuration("rotation period must be non-zero".into()));
        }
        if self.retention.is_zero() {
            return Err(Error::Configuration("retention window must be non-zero".into()));
        }
        if self.link_name.is_empty() || self.link_name.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "link name must be a file name, got {:?}",
                self.link_name
            )));
        }

        let pattern = FilePattern::new(self.file_pattern.clone())?;

        let period = chrono::TimeDelta::from_std(self.period)
            .map_err(|_| Error::Configuration("rotation period out of range".into()))?;
        let sample = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 0).single().ok_or_else(|| {
            Error::Configuration("cannot build sample instant".into())
        })?;
        let first = pattern.render(sample);
        let second = pattern.render(sample + period);
        if first == second {
            return Err(Error::Configuration(format!(
                "file pattern {} is too coarse for a {:?} period",
                self.file_pattern, self.period
            )));
        }
        if pattern.parse(&self.link_name).is_some() {
            return Err(Error::Configuration(format!(
                "link name {} matches the file pattern",
                self.link_name
            )));
        }

        Ok(pattern)
    }
}

/// Builder for [`RotationConfig`]
#[derive(Debug, Clone, Default)]
pub struct RotationConfigBuilder {
    config: RotationConfig,
}

impl RotationConfigBuilder {
    /// Set the log directory
    #[must_use]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Set the file name pattern
    #[must_use]
    pub fn file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.file_pattern = pattern.into();
        self
    }

    /// Set the link name
    #[must_use]
    pub fn link_name(mut self, name: impl Into<String>) -> Self {
        self.config.link_name = name.into();
        self
    }

    /// Set the bucket length
    #[must_use]
    pub const fn period(mut self, period: Duration) -> Self {
        self.config.period = period;
        self
    }

    /// Set the retention window
    #[must_use]
    pub const fn retention(mut self, retention: Duration) -> Self {
        self.config.retention = retention;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// See [`RotationConfig::validate`].
    pub fn build(self) -> Result<RotationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
