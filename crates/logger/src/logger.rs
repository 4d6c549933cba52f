//! The logger facade

use crate::console::ConsoleDestination;
use crate::sink::{DestinationKind, FanoutSink};
use crate::{BuildMode, Entry, LoggerConfig, PipeWriter, Result};
use fanlog_core::{Color, Connection, Fields, Formatter, Level, LevelColors, Line, LogEvent};
use fanlog_file::{RotatingFileWriter, RotationConfig};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Exit status passed to the exit function by fatal events.
pub const FATAL_EXIT_STATUS: i32 = 1;

/// Called with [`FATAL_EXIT_STATUS`] after a fatal event is delivered.
pub type ExitFn = Arc<dyn Fn(i32) + Send + Sync>;

fn exit_process(code: i32) {
    std::process::exit(code);
}

/// Settings guarded by the configuration lock.
struct Settings {
    level: Level,
    colors: Arc<LevelColors>,
    exit: ExitFn,
    build_mode: BuildMode,
    rotation: RotationConfig,
    /// Set once a caller supplied its own console stream; build mode
    /// changes then leave the console alone.
    custom_console: bool,
}

/// What one logging call needs from the settings, copied out so the lock is
/// not held while writing.
struct Snapshot {
    level: Level,
    colors: Arc<LevelColors>,
    exit: ExitFn,
}

/// A structured logger writing to console, rotating files, and one
/// streaming subscriber.
///
/// Every method takes `&self`; share a logger across threads behind an
/// `Arc` or use the process-wide [`global`](crate::global) one.
///
/// ```
/// use fanlog::{Level, Logger, LoggerConfig};
///
/// let logger = Logger::with_config(LoggerConfig {
///     console: false,
///     ..LoggerConfig::default()
/// })
/// .unwrap();
///
/// logger.set_level(Level::Info);
/// logger.with_tag("BSC").with_field("height", 42).info("block imported");
/// ```
///
/// Configuration changes take the configuration lock and then the lock of
/// the destination they touch; logging calls only hold the configuration
/// lock long enough to copy the level, colors, and exit function.
pub struct Logger {
    settings: Mutex<Settings>,
    sink: FanoutSink,
    formatter: Formatter,
}

impl Logger {
    /// Create a logger with the default configuration: debug level, colored
    /// console output, no rotation, no subscriber.
    #[must_use]
    pub fn new() -> Self {
        let config = LoggerConfig::default();
        let logger = Self::unconfigured(&config);
        logger.sink.install(
            DestinationKind::Console,
            Box::new(ConsoleDestination::stdout(config.build_mode)),
        );
        logger
    }

    /// Create a logger from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Rotation` if the rotation settings are invalid, or if
    /// rotation is enabled and the log directory cannot be created.
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        config.rotation.validate()?;

        let logger = Self::unconfigured(&config);
        if config.console {
            logger.sink.install(
                DestinationKind::Console,
                Box::new(ConsoleDestination::stdout(config.build_mode)),
            );
        }
        if config.rotation_enabled {
            logger.set_rotation_enabled(true)?;
        }
        Ok(logger)
    }

    fn unconfigured(config: &LoggerConfig) -> Self {
        Self {
            settings: Mutex::new(Settings {
                level: config.level,
                colors: Arc::new(LevelColors::default()),
                exit: Arc::new(exit_process),
                build_mode: config.build_mode,
                rotation: config.rotation.clone(),
                custom_console: false,
            }),
            sink: FanoutSink::new(),
            formatter: Formatter::new(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        let settings = self.settings.lock();
        Snapshot {
            level: settings.level,
            colors: Arc::clone(&settings.colors),
            exit: Arc::clone(&settings.exit),
        }
    }

    // Logging

    /// Whether an event at `level` would be formatted at all.
    ///
    /// Fatal and panic events always are, since their side effects happen
    /// even when nothing receives the line.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level.is_terminal() || (level >= self.level() && self.sink.any_enabled())
    }

    /// Log an error
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Error, message);
    }

    /// Log a warning
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Warn, message);
    }

    /// Log info
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Info, message);
    }

    /// Log debug
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Debug, message);
    }

    /// Log trace
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Trace, message);
    }

    /// Log a fatal event, then call the exit function with
    /// [`FATAL_EXIT_STATUS`].
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Fatal, message);
    }

    /// Log a panic event, then panic with the formatted line.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        Entry::new(self).log(Level::Panic, message);
    }

    /// Start an entry carrying `tag`.
    pub fn with_tag(&self, tag: impl Into<String>) -> Entry<'_> {
        Entry::new(self).with_tag(tag)
    }

    /// Start an entry carrying one field.
    pub fn with_field<T: Serialize>(&self, key: impl Into<String>, value: T) -> Entry<'_> {
        Entry::new(self).with_field(key, value)
    }

    /// Start an entry carrying `fields`.
    pub fn with_fields(&self, fields: Fields) -> Entry<'_> {
        Entry::new(self).with_fields(fields)
    }

    /// Format and deliver a prebuilt event.
    ///
    /// Returns the outcome of the last destination written, or `Ok(0)` when
    /// the event was filtered or nothing is enabled.
    ///
    /// # Panics
    ///
    /// Panics with the formatted line for `Level::Panic` events.
    pub fn log(&self, event: LogEvent) -> io::Result<usize> {
        self.emit(event, true)
    }

    /// Deliver an event from a pipe: no fatal or panic side effects.
    pub(crate) fn relay(&self, event: LogEvent) -> io::Result<usize> {
        self.emit(event, false)
    }

    fn emit(&self, event: LogEvent, terminal_effects: bool) -> io::Result<usize> {
        let Snapshot {
            level: min_level,
            colors,
            exit,
        } = self.snapshot();

        let level = Formatter::effective_level(&event);
        let terminal = terminal_effects && event.level.is_terminal();
        let deliver = level >= min_level && self.sink.any_enabled();
        if !deliver && !terminal {
            return Ok(0);
        }

        let bytes = self.formatter.format(&event);
        let result = if deliver {
            self.sink
                .write(&Line::new(level, &bytes).with_style(colors.get(level)))
        } else {
            Ok(0)
        };

        if terminal {
            if let Err(e) = self.sink.flush() {
                debug!("Flush before {} event failed: {}", event.level, e);
            }
            match event.level {
                Level::Fatal => exit(FATAL_EXIT_STATUS),
                Level::Panic => panic!("{}", String::from_utf8_lossy(&bytes).trim_end()),
                _ => {}
            }
        }

        result
    }

    /// A writer that turns every line written to it into an event at
    /// `level`, such as a child process's output.
    pub fn writer(&self, level: Level) -> PipeWriter<'_> {
        PipeWriter::new(self, level)
    }

    /// Flush every destination.
    ///
    /// # Errors
    ///
    /// Returns the first flush error.
    pub fn flush(&self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Flush and close every destination; the rotation file handle is
    /// released and reopened by the next write.
    ///
    /// # Errors
    ///
    /// Returns the first close error.
    pub fn close(&self) -> io::Result<()> {
        self.sink.close()
    }

    // Configuration

    /// Set the minimum level delivered to destinations.
    pub fn set_level(&self, level: Level) -> &Self {
        self.settings.lock().level = level;
        self
    }

    /// Set the console foreground color for `level`.
    pub fn set_level_color(&self, level: Level, color: Color) -> &Self {
        let mut settings = self.settings.lock();
        Arc::make_mut(&mut settings.colors).set(level, color);
        self
    }

    /// Replace the function fatal events call after delivery.
    pub fn set_exit_func<F>(&self, exit: F) -> &Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.settings.lock().exit = Arc::new(exit);
        self
    }

    /// Turn console output on or off.
    pub fn set_console_enabled(&self, enabled: bool) -> &Self {
        let settings = self.settings.lock();
        if enabled && !self.sink.is_installed(DestinationKind::Console) {
            self.sink.install(
                DestinationKind::Console,
                Box::new(ConsoleDestination::stdout(settings.build_mode)),
            );
        } else {
            self.sink
                .set_destination_enabled(DestinationKind::Console, enabled);
        }
        self
    }

    /// Send console output to `console` instead of standard output, and
    /// enable it.
    pub fn set_console(&self, console: ConsoleDestination) -> &Self {
        let mut settings = self.settings.lock();
        settings.custom_console = true;
        drop(self.sink.install(DestinationKind::Console, Box::new(console)));
        self
    }

    /// Change the console color policy.
    ///
    /// A standard output console is reopened with the new policy, keeping
    /// its enabled state; a console set with [`Logger::set_console`] is left
    /// as is.
    pub fn set_build_mode(&self, mode: BuildMode) -> &Self {
        let mut settings = self.settings.lock();
        if settings.build_mode == mode {
            return self;
        }
        settings.build_mode = mode;

        if !settings.custom_console && self.sink.is_installed(DestinationKind::Console) {
            drop(self.sink.replace(
                DestinationKind::Console,
                Box::new(ConsoleDestination::stdout(mode)),
            ));
        }
        self
    }

    /// Attach a streaming subscriber, replacing and closing any previous one.
    ///
    /// The subscriber is dropped after its first failed send.
    pub fn set_network_connection<C>(&self, connection: C) -> &Self
    where
        C: Connection + 'static,
    {
        let _settings = self.settings.lock();
        self.sink.set_network_connection(Box::new(connection));
        self
    }

    /// Detach the streaming subscriber, closing it.
    pub fn clear_network_connection(&self) -> &Self {
        let _settings = self.settings.lock();
        drop(self.sink.remove(DestinationKind::Network));
        self
    }

    /// Turn rotating file output on or off.
    ///
    /// Enabling when already enabled keeps the open writer. Disabling
    /// flushes and closes the current file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Rotation` if the log directory cannot be created; file
    /// output then stays off.
    pub fn set_rotation_enabled(&self, enabled: bool) -> Result<&Self> {
        let settings = self.settings.lock();

        if !enabled {
            drop(self.sink.remove(DestinationKind::File));
            return Ok(self);
        }
        if self.sink.is_installed(DestinationKind::File) {
            return Ok(self);
        }

        let writer = open_writer(&settings.rotation)?;
        self.sink.install(DestinationKind::File, Box::new(writer));
        Ok(self)
    }

    /// Change the bucket length and retention window.
    ///
    /// # Errors
    ///
    /// Returns `Error::Rotation` and keeps the previous settings if the new
    /// ones are invalid.
    pub fn set_rotation(
        &self,
        period: std::time::Duration,
        retention: std::time::Duration,
    ) -> Result<&Self> {
        let mut settings = self.settings.lock();
        let mut rotation = settings.rotation.clone();
        rotation.period = period;
        rotation.retention = retention;

        self.apply_rotation(&mut settings, rotation)?;
        Ok(self)
    }

    /// Replace the whole rotation configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Rotation` and keeps the previous settings if the new
    /// ones are invalid, or if rotation is on and the new directory cannot be
    /// created.
    pub fn set_rotation_config(&self, rotation: RotationConfig) -> Result<&Self> {
        let mut settings = self.settings.lock();
        self.apply_rotation(&mut settings, rotation)?;
        Ok(self)
    }

    fn apply_rotation(&self, settings: &mut Settings, rotation: RotationConfig) -> Result<()> {
        if self.sink.is_installed(DestinationKind::File) {
            // The replaced writer flushes and closes its file on drop.
            let writer = open_writer(&rotation)?;
            drop(self.sink.replace(DestinationKind::File, Box::new(writer)));
        } else {
            rotation.validate()?;
        }
        settings.rotation = rotation;
        Ok(())
    }

    // Accessors

    /// Minimum level delivered to destinations
    #[must_use]
    pub fn level(&self) -> Level {
        self.settings.lock().level
    }

    /// Console color policy
    #[must_use]
    pub fn build_mode(&self) -> BuildMode {
        self.settings.lock().build_mode
    }

    /// Current per-level console colors
    #[must_use]
    pub fn level_colors(&self) -> LevelColors {
        LevelColors::clone(&self.settings.lock().colors)
    }

    /// Current rotation settings, whether or not rotation is enabled
    #[must_use]
    pub fn rotation_config(&self) -> RotationConfig {
        self.settings.lock().rotation.clone()
    }

    /// Whether console output is on
    #[must_use]
    pub fn is_console_enabled(&self) -> bool {
        self.sink.is_enabled(DestinationKind::Console)
    }

    /// Whether rotating file output is on
    #[must_use]
    pub fn is_rotation_enabled(&self) -> bool {
        self.sink.is_enabled(DestinationKind::File)
    }

    /// Whether a streaming subscriber is attached
    #[must_use]
    pub fn is_network_enabled(&self) -> bool {
        self.sink.is_enabled(DestinationKind::Network)
    }
}

fn open_writer(rotation: &RotationConfig) -> fanlog_file::Result<RotatingFileWriter> {
    let writer = RotatingFileWriter::new(rotation.clone())?;
    fs::create_dir_all(&rotation.directory).map_err(|source| {
        fanlog_file::Error::CreateDirectory {
            path: rotation.directory.clone(),
            source,
        }
    })?;
    Ok(writer)
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Logger> for Logger {
    fn as_ref(&self) -> &Logger {
        self
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings.lock();
        f.debug_struct("Logger")
            .field("level", &settings.level)
            .field("build_mode", &settings.build_mode)
            .field("rotation", &settings.rotation)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}
