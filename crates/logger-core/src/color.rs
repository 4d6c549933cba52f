//! Level to terminal style table

use crate::Level;
use termcolor::{Color, ColorSpec};

/// Console style for each level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelColors {
    specs: [ColorSpec; 7],
}

impl LevelColors {
    /// Style used for `level`.
    #[must_use]
    pub fn get(&self, level: Level) -> &ColorSpec {
        &self.specs[level.index()]
    }

    /// Replace the foreground color used for `level`.
    pub fn set(&mut self, level: Level, color: Color) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color));
        self.specs[level.index()] = spec;
    }

    /// Replace the whole style used for `level`.
    pub fn set_spec(&mut self, level: Level, spec: ColorSpec) {
        self.specs[level.index()] = spec;
    }
}

fn fg(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

impl Default for LevelColors {
    fn default() -> Self {
        let mut trace = fg(Color::White);
        trace.set_intense(true);

        Self {
            specs: [
                trace,
                fg(Color::Magenta),
                fg(Color::Green),
                fg(Color::Yellow),
                fg(Color::Red),
                fg(Color::Red),
                fg(Color::Red),
            ],
        }
    }
}
