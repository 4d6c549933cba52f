//! Logger configuration

use fanlog_core::Level;
use fanlog_file::RotationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use termcolor::ColorChoice;

/// How console output is colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Colors only when the console supports them
    #[default]
    Release,
    /// Always emit ANSI escapes, even into pipes
    Development,
}

impl BuildMode {
    /// Color policy for console output in this mode
    #[must_use]
    pub const fn color_choice(self) -> ColorChoice {
        match self {
            Self::Release => ColorChoice::Auto,
            Self::Development => ColorChoice::AlwaysAnsi,
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => write!(f, "release"),
            Self::Development => write!(f, "development"),
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rel" | "release" => Ok(Self::Release),
            "dev" | "debug" | "development" => Ok(Self::Development),
            other => Err(format!("unknown build mode: {other}")),
        }
    }
}

/// Initial configuration for a [`Logger`](crate::Logger).
///
/// ```
/// use fanlog::{Level, LoggerConfig};
///
/// let config: LoggerConfig = serde_json::from_str(r#"{"level": "warn"}"#).unwrap();
/// assert_eq!(config.level, Level::Warn);
/// assert!(config.console);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level delivered to destinations
    pub level: Level,
    /// Whether the console destination starts enabled
    pub console: bool,
    /// Whether rotating file output starts enabled
    pub rotation_enabled: bool,
    /// Rotating file settings, used whenever rotation is enabled
    pub rotation: RotationConfig,
    /// Console color policy
    pub build_mode: BuildMode,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            console: true,
            rotation_enabled: false,
            rotation: RotationConfig::default(),
            build_mode: BuildMode::default(),
        }
    }
}
