//! Progress spinner, colored output, shell snippets and summary formatting.
//!
//! Shell snippets and deletion confirmations go to stdout so the output can be
//! piped into a shell. Everything else (progress, diagnostics, errors, the
//! summary) goes to stderr.

use crate::config::Config;
use crate::constants::{PROGRESS_TICK_MS, SHORT_SHA_LEN};
use crate::detect::MergeVerdict;
use crate::git::GitError;
use crate::sweep::{BranchOutcome, Disposition, SweepCallbacks, SweepReport};
use anyhow::Context;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Null object for [`SweepCallbacks`]; interactive confirmations are granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl SweepCallbacks for NoOpCallbacks {
    fn on_detect_failed(&self, _branch: &str, _error: &GitError) {}
    fn on_deleted(&self, _verdict: &MergeVerdict, _disposition: Disposition) {}
    fn on_advice(&self, _verdict: &MergeVerdict, _disposition: Disposition) {}
}

/// Terminal presentation of a sweep.
/// Uses `Option` to avoid allocating a spinner when progress is hidden (quiet/verbose modes).
pub struct TerminalCallbacks {
    spinner: Option<ProgressBar>,
    config: Config,
}

impl TerminalCallbacks {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spinner: create_spinner(&config),
            config,
        }
    }
}

impl SweepCallbacks for TerminalCallbacks {
    fn on_detect_start(&self, branch: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("Checking {}...", branch));
        }
    }

    fn on_detect_complete(&self, branch: &str, outcome: &BranchOutcome) {
        if !self.config.is_verbose() {
            return;
        }
        if let Some(line) = format_outcome_line(branch, outcome) {
            eprintln!("  {}", line);
        }
    }

    fn on_detection_finished(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }

    fn on_detect_failed(&self, branch: &str, error: &GitError) {
        eprintln!(
            "{} {}: {}",
            "error:".red().bold(),
            branch.white().bold(),
            error
        );
    }

    fn on_deleted(&self, verdict: &MergeVerdict, disposition: Disposition) {
        println!(
            "{} {} ({})",
            "Deleted".green().bold(),
            verdict.branch,
            describe(verdict, disposition)
        );
    }

    fn on_advice(&self, verdict: &MergeVerdict, _disposition: Disposition) {
        print!("{}", format_snippet(verdict));
    }

    fn confirm_delete(
        &self,
        verdict: &MergeVerdict,
        disposition: Disposition,
    ) -> anyhow::Result<bool> {
        Confirm::new()
            .with_prompt(format!(
                "Delete {} ({})?",
                verdict.branch,
                describe(verdict, disposition)
            ))
            .default(false)
            .interact()
            .context("Failed to read deletion confirmation")
    }
}

/// Creates the detection spinner.
/// Returns `None` in quiet or verbose mode.
fn create_spinner(config: &Config) -> Option<ProgressBar> {
    if config.is_quiet() || config.is_verbose() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .expect("valid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    Some(spinner)
}

pub fn print_sweep_start(trunk: &str, config: &Config) {
    if config.is_quiet() {
        return;
    }
    eprintln!(
        "{} {}",
        "Sweeping branches merged into".cyan(),
        trunk.white().bold()
    );
}

pub fn print_summary(report: &SweepReport, duration: Duration, config: &Config) {
    if config.is_quiet() {
        return;
    }
    eprintln!("{}", format_summary(report, duration));
}

fn format_summary(report: &SweepReport, duration: Duration) -> String {
    let mut parts = vec![
        format!("{} deleted", report.deleted()).green().to_string(),
        format!("{} to review", report.advised()).yellow().to_string(),
    ];
    if report.declined() > 0 {
        parts.push(format!("{} kept", report.declined()));
    }
    if report.failed() > 0 {
        parts.push(format!("{} failed", report.failed()).red().to_string());
    }
    format!(
        "{}: {} branches in {}: {}",
        "Total".white().bold(),
        report.checked(),
        format_duration(duration),
        parts.join(", ")
    )
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

fn describe(verdict: &MergeVerdict, disposition: Disposition) -> String {
    match (disposition, verdict.matched_commit.as_deref()) {
        (Disposition::CleanlyMerged, _) => "cleanly merged".to_string(),
        (Disposition::Merged, Some(sha)) => format!("merged as {}", short_sha(sha)),
        (Disposition::Merged, None) => "merged".to_string(),
        (Disposition::PotentiallyMerged, _) => "potentially merged".to_string(),
        (Disposition::NotMerged, _) => "not merged".to_string(),
    }
}

/// Manual comparison command, the delete command, then a blank separator line.
/// Exact merges have nothing to compare, so a shell comment takes the first line.
fn format_snippet(verdict: &MergeVerdict) -> String {
    let first_line = match &verdict.comparison_command {
        Some(command) => command.clone(),
        None => format!(
            "# {} tip is on trunk at {}",
            verdict.branch,
            short_sha(&verdict.merge_base)
        ),
    };
    let mut snippet = first_line;
    snippet.push('\n');
    snippet.push_str(&format!("git branch -D {}\n\n", verdict.branch));
    snippet
}

fn format_outcome_line(branch: &str, outcome: &BranchOutcome) -> Option<String> {
    match outcome {
        BranchOutcome::Checked {
            verdict: Some(verdict),
            ..
        } if verdict.exact => Some(format!("{}: tip is on trunk", branch)),
        BranchOutcome::Checked {
            verdict: Some(verdict),
            disposition,
        } => Some(format!(
            "{}: best match {} subject {:.3} diff {:.3} size {} commits {} -> {}",
            branch,
            verdict.matched_commit.as_deref().map(short_sha).unwrap_or("-"),
            verdict.subject_similarity,
            verdict.diff_similarity,
            verdict.diff_size,
            verdict.commit_count,
            describe(verdict, *disposition)
        )),
        BranchOutcome::Checked { verdict: None, .. } => {
            Some(format!("{}: no trunk commits since merge base", branch))
        }
        BranchOutcome::Trunk | BranchOutcome::Failed(_) => None,
    }
}
