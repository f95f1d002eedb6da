use anyhow::Context;
use clap::Parser;
use git_sweep_rust::config::{Config, DeleteMode, Thresholds, Verbosity};
use git_sweep_rust::constants::{
    DEFAULT_JOBS, DEFAULT_MIN_DIFF_SCORE, DEFAULT_MIN_DIFF_SIZE, DEFAULT_MIN_SUBJECT_SCORE,
};
use git_sweep_rust::git::CliGit;
use git_sweep_rust::output::{self, TerminalCallbacks};
use git_sweep_rust::sweep;
use std::time::Instant;

/// Delete local branches whose work already landed on trunk, including
/// rebased and squash-merged ones.
#[derive(Parser, Debug)]
#[command(name = "git-sweep", version)]
struct Cli {
    /// Show git commands and per-branch scores
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print deletions and snippets
    #[arg(short, long)]
    quiet: bool,

    /// Only act on exact and perfect matches; hide "potentially merged" advice
    #[arg(long)]
    perfect: bool,

    /// Print the commands instead of deleting anything
    #[arg(long, conflicts_with = "interactive")]
    dry_run: bool,

    /// Ask before deleting each branch
    #[arg(short, long)]
    interactive: bool,

    /// Minimum subject similarity (0-1) for a fuzzy match
    #[arg(long, value_name = "SCORE", default_value_t = DEFAULT_MIN_SUBJECT_SCORE, value_parser = parse_score)]
    min_subject_score: f64,

    /// Minimum diff similarity (0-1) for a fuzzy match
    #[arg(long, value_name = "SCORE", default_value_t = DEFAULT_MIN_DIFF_SCORE, value_parser = parse_score)]
    min_diff_score: f64,

    /// Diffs up to this many characters never count as perfect matches
    #[arg(long, value_name = "CHARS", default_value_t = DEFAULT_MIN_DIFF_SIZE)]
    min_diff_size: usize,

    /// Threads used to compare branches
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_JOBS, value_parser = parse_jobs)]
    jobs: usize,
}

fn parse_score(value: &str) -> Result<f64, String> {
    let score: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !(0.0..=1.0).contains(&score) {
        return Err(format!("{} is not between 0 and 1", score));
    }
    Ok(score)
}

fn parse_jobs(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("'{}' is not a positive thread count", value)),
        Ok(jobs) => Ok(jobs),
    }
}

impl Cli {
    fn config(&self) -> Config {
        let verbosity = if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        };
        let delete_mode = if self.dry_run {
            DeleteMode::DryRun
        } else if self.interactive {
            DeleteMode::Interactive
        } else {
            DeleteMode::Auto
        };
        Config {
            verbosity,
            thresholds: Thresholds {
                min_subject_score: self.min_subject_score,
                min_diff_score: self.min_diff_score,
                min_diff_size: self.min_diff_size,
            },
            perfect_only: self.perfect,
            delete_mode,
            jobs: self.jobs,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Usage errors exit 1; --help and --version still exit 0.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        if err.use_stderr() {
            let _ = err.print();
            std::process::exit(1);
        }
        err.exit()
    });
    let config = cli.config();

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let git = CliGit::new(cwd, config.git_logger());
    let trunk = sweep::ensure_trunk(&git)?;
    output::print_sweep_start(&trunk, &config);

    let start = Instant::now();
    let callbacks = TerminalCallbacks::new(config);
    let report = sweep::sweep(&git, &trunk, &config, &callbacks)?;
    output::print_summary(&report, start.elapsed(), &config);

    Ok(())
}
