//! Git command wrappers.
//!
//! This module provides a thin wrapper around git CLI commands,
//! handling command execution and error formatting. Everything the
//! merge detector needs from a repository goes through [`GitRepo`], so
//! the detector can be driven by an in-memory fake in tests.

use crate::constants::BRANCH_REF_PREFIX;
use colored::Colorize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Callback invoked with the arguments of every git command before it runs.
pub type GitLogger = fn(&[&str]);

/// Echoes git commands to stderr (verbose mode).
pub fn verbose_logger(args: &[&str]) {
    eprintln!("    {}", format!("$ git {}", args.join(" ")).dimmed());
}

pub fn no_op_logger(_args: &[&str]) {}

/// Fully qualified ref for a local branch. A tag sharing the branch's
/// short name would otherwise win in revision lookups.
pub fn branch_ref(name: &str) -> String {
    format!("{}{}", BRANCH_REF_PREFIX, name)
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to spawn git command `git {command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {command} failed ({}): {stderr}", exit_status_label(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("HEAD is detached; check out a trunk branch first")]
    NotOnBranch,
    #[error("no common ancestor between '{left}' and '{right}'")]
    NoCommonAncestor { left: String, right: String },
    #[error("Invalid ref name: {0:?}")]
    InvalidRef(String),
}

fn exit_status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "killed by signal".to_string(),
    }
}

/// Runs `git <args>` inside `repo` and returns trimmed stdout.
pub fn run_git(repo: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = std::process::Command::new("git")
        .current_dir(repo)
        .args(args)
        .output()
        .map_err(|source| GitError::Spawn {
            command: args.join(" "),
            source,
        })?;

    if output.status.success() {
        let result = String::from_utf8_lossy(&output.stdout);
        Ok(result.as_ref().trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(GitError::CommandFailed {
            command: args.join(" "),
            status: output.status.code(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn validate_ref_name(name: &str) -> Result<(), GitError> {
    if name.is_empty()
        || name.starts_with('-')
        || name.contains('\0')
        || name.chars().any(char::is_whitespace)
    {
        return Err(GitError::InvalidRef(name.to_string()));
    }
    Ok(())
}

/// Read-only repository queries plus the single branch deletion the sweep performs.
pub trait GitRepo {
    /// All local branch names, in ref-store order.
    fn list_local_branches(&self) -> Result<Vec<String>, GitError>;

    /// Name of the checked-out branch; [`GitError::NotOnBranch`] when detached.
    fn current_branch_name(&self) -> Result<String, GitError>;

    fn merge_base(&self, left: &str, right: &str) -> Result<String, GitError>;

    fn rev_parse(&self, reference: &str) -> Result<String, GitError>;

    /// Commits reachable from `end` but not from `start`, newest first.
    fn commits_between(&self, start: &str, end: &str) -> Result<Vec<String>, GitError>;

    fn commit_subject(&self, sha: &str) -> Result<String, GitError>;

    /// Full `git show` rendering of one commit (header, message and diff).
    fn commit_show(&self, sha: &str) -> Result<String, GitError>;

    /// Cumulative diff from `start` to `end`.
    fn combined_diff(&self, start: &str, end: &str) -> Result<String, GitError>;

    /// Force-deletes a local branch.
    fn delete_branch(&self, name: &str) -> Result<(), GitError>;
}

/// [`GitRepo`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct CliGit {
    path: PathBuf,
    logger: GitLogger,
}

impl CliGit {
    pub fn new(path: impl Into<PathBuf>, logger: GitLogger) -> Self {
        Self {
            path: path.into(),
            logger,
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        (self.logger)(args);
        run_git(&self.path, args)
    }
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl GitRepo for CliGit {
    fn list_local_branches(&self) -> Result<Vec<String>, GitError> {
        let output = self.run(&["for-each-ref", "--format=%(refname)", BRANCH_REF_PREFIX])?;
        Ok(non_empty_lines(&output)
            .into_iter()
            .map(|line| {
                line.strip_prefix(BRANCH_REF_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(line)
            })
            .collect())
    }

    fn current_branch_name(&self) -> Result<String, GitError> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if branch == "HEAD" {
            return Err(GitError::NotOnBranch);
        }
        Ok(branch)
    }

    fn merge_base(&self, left: &str, right: &str) -> Result<String, GitError> {
        validate_ref_name(left)?;
        validate_ref_name(right)?;
        match self.run(&["merge-base", left, right]) {
            // merge-base exits 1 without a message when the histories are disjoint
            Err(GitError::CommandFailed {
                status: Some(1),
                stderr,
                ..
            }) if stderr.is_empty() => Err(GitError::NoCommonAncestor {
                left: left.to_string(),
                right: right.to_string(),
            }),
            other => other,
        }
    }

    fn rev_parse(&self, reference: &str) -> Result<String, GitError> {
        validate_ref_name(reference)?;
        let spec = format!("{}^{{commit}}", reference);
        self.run(&["rev-parse", "--verify", &spec])
    }

    fn commits_between(&self, start: &str, end: &str) -> Result<Vec<String>, GitError> {
        validate_ref_name(start)?;
        validate_ref_name(end)?;
        let range = format!("{}..{}", start, end);
        let output = self.run(&["log", "--format=format:%H", &range])?;
        Ok(non_empty_lines(&output))
    }

    fn commit_subject(&self, sha: &str) -> Result<String, GitError> {
        validate_ref_name(sha)?;
        self.run(&["log", "-1", "--format=%s", sha])
    }

    fn commit_show(&self, sha: &str) -> Result<String, GitError> {
        validate_ref_name(sha)?;
        self.run(&["--no-pager", "show", "--no-color", "--no-ext-diff", sha])
    }

    fn combined_diff(&self, start: &str, end: &str) -> Result<String, GitError> {
        validate_ref_name(start)?;
        validate_ref_name(end)?;
        self.run(&["--no-pager", "diff", "--no-color", "--no-ext-diff", start, end])
    }

    fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        validate_ref_name(name)?;
        self.run(&["branch", "-D", name])?;
        Ok(())
    }
}
