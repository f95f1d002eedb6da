//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic numbers throughout the codebase.

/// Branch names accepted as trunk. The sweep refuses to run from anything else.
pub const TRUNK_BRANCHES: [&str; 3] = ["main", "master", "trunk"];

/// Namespace of local branch refs.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Default minimum Jaro-Winkler score between commit subjects.
pub const DEFAULT_MIN_SUBJECT_SCORE: f64 = 0.9;

/// Default minimum Jaro-Winkler score between normalized diffs.
pub const DEFAULT_MIN_DIFF_SCORE: f64 = 0.9;

/// A diff must be longer than this (in characters) to count as a perfect match.
/// Tiny diffs coincide too easily to be trusted for automatic deletion.
pub const DEFAULT_MIN_DIFF_SIZE: usize = 100;

/// Default number of detection threads. One keeps the pass sequential.
pub const DEFAULT_JOBS: usize = 1;

/// Winkler prefix scaling factor.
pub const WINKLER_PREFIX_SCALE: f64 = 0.1;

/// Maximum common prefix length rewarded by Jaro-Winkler.
pub const WINKLER_MAX_PREFIX: usize = 4;

/// Progress bar tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Number of sha characters shown in human-readable output.
pub const SHORT_SHA_LEN: usize = 7;
