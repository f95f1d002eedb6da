//! Merged-branch sweeper library.
//!
//! This crate finds local git branches whose work already landed on trunk
//! and deletes them (or prints what to run). Beyond plain merges it catches:
//! - Branches rebased onto trunk, where every SHA changed
//! - Branches squash-merged into a single trunk commit
//!
//! Detection pairs each branch with the trunk commit whose subject matches
//! best, then compares normalized diffs with Jaro-Winkler similarity.

pub mod config;
pub mod constants;
pub mod detect;
pub mod fingerprint;
pub mod git;
pub mod normalize;
pub mod output;
pub mod similarity;
pub mod sweep;

#[cfg(test)]
mod fake_git;
