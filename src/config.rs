//! Configuration types for CLI verbosity, thresholds and deletion policy.

use crate::constants::{
    DEFAULT_JOBS, DEFAULT_MIN_DIFF_SCORE, DEFAULT_MIN_DIFF_SIZE, DEFAULT_MIN_SUBJECT_SCORE,
};
use crate::git::{self, GitLogger};

/// Runtime configuration derived from CLI arguments.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Controls the verbosity level of CLI output.
    pub verbosity: Verbosity,
    pub thresholds: Thresholds,
    /// Only act on exact and perfect matches; suppress "potentially merged" advice.
    pub perfect_only: bool,
    pub delete_mode: DeleteMode,
    /// Worker threads for the detection phase.
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            thresholds: Thresholds::default(),
            perfect_only: false,
            delete_mode: DeleteMode::default(),
            jobs: DEFAULT_JOBS,
        }
    }
}

impl Config {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Returns the appropriate git logger based on verbosity settings.
    ///
    /// Config only picks which logger function to use; the logging itself
    /// lives as callbacks in the git module.
    #[must_use]
    pub fn git_logger(&self) -> GitLogger {
        if self.is_verbose() {
            git::verbose_logger
        } else {
            git::no_op_logger
        }
    }
}

/// Verbosity level for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Score and size limits a fuzzy verdict must clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Subject similarity must be strictly greater than this.
    pub min_subject_score: f64,
    /// Diff similarity must be strictly greater than this.
    pub min_diff_score: f64,
    /// A perfect diff match only counts when the diff is longer than this many characters.
    pub min_diff_size: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_subject_score: DEFAULT_MIN_SUBJECT_SCORE,
            min_diff_score: DEFAULT_MIN_DIFF_SCORE,
            min_diff_size: DEFAULT_MIN_DIFF_SIZE,
        }
    }
}

/// What happens to branches classified as merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Delete them.
    #[default]
    Auto,
    /// Print the shell snippet instead of deleting.
    DryRun,
    /// Ask before each deletion.
    Interactive,
}
