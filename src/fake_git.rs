//! In-memory [`GitRepo`] used by unit tests.
//!
//! Models a single-parent commit graph. Commit shows are counted per sha and
//! deletions are recorded so tests can assert on adapter traffic.

use crate::constants::BRANCH_REF_PREFIX;
use crate::git::{GitError, GitRepo};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct FakeCommit {
    parent: Option<String>,
    subject: String,
    diff: String,
}

#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    commits: HashMap<String, FakeCommit>,
    branches: Mutex<Vec<(String, String)>>,
    current: Option<String>,
    broken_branches: HashSet<String>,
    undeletable_branches: HashSet<String>,
    show_calls: Mutex<HashMap<String, usize>>,
    deleted: Mutex<Vec<String>>,
}

/// A one-hunk unified diff replacing `old` with `new` in `path`.
/// `blobs` and `line` vary the volatile tokens without changing content.
pub(crate) fn file_diff(path: &str, old: &str, new: &str, blobs: (&str, &str), line: u32) -> String {
    format!(
        "diff --git a/{path} b/{path}\nindex {}..{} 100644\n--- a/{path}\n+++ b/{path}\n@@ -{line},1 +{line},1 @@\n-{old}\n+{new}",
        blobs.0, blobs.1
    )
}

fn unknown_revision(reference: &str) -> GitError {
    GitError::CommandFailed {
        command: format!("rev-parse --verify {}", reference),
        status: Some(128),
        stderr: format!("fatal: Needed a single revision: {}", reference),
    }
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(mut self, sha: &str, parent: Option<&str>, subject: &str, diff: &str) -> Self {
        self.commits.insert(
            sha.to_string(),
            FakeCommit {
                parent: parent.map(str::to_string),
                subject: subject.to_string(),
                diff: diff.to_string(),
            },
        );
        self
    }

    pub fn branch(self, name: &str, tip: &str) -> Self {
        self.branches
            .lock()
            .expect("fake branches mutex poisoned")
            .push((name.to_string(), tip.to_string()));
        self
    }

    pub fn checkout(mut self, name: &str) -> Self {
        self.current = Some(name.to_string());
        self
    }

    /// Makes every query naming `branch` fail.
    pub fn break_branch(mut self, branch: &str) -> Self {
        self.broken_branches.insert(branch.to_string());
        self
    }

    pub fn refuse_delete(mut self, branch: &str) -> Self {
        self.undeletable_branches.insert(branch.to_string());
        self
    }

    pub fn show_calls(&self, sha: &str) -> usize {
        self.show_calls
            .lock()
            .expect("fake show counter poisoned")
            .get(sha)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_show_calls(&self) -> usize {
        self.show_calls
            .lock()
            .expect("fake show counter poisoned")
            .values()
            .sum()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("fake deleted mutex poisoned").clone()
    }

    fn resolve(&self, reference: &str) -> Result<String, GitError> {
        let short = reference.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(reference);
        if self.broken_branches.contains(short) {
            return Err(unknown_revision(reference));
        }
        if let Some(inner) = reference.strip_suffix('^') {
            let sha = self.resolve(inner)?;
            return self
                .commit_of(&sha)?
                .parent
                .clone()
                .ok_or_else(|| unknown_revision(reference));
        }
        let branches = self.branches.lock().expect("fake branches mutex poisoned");
        if let Some((_, tip)) = branches.iter().find(|(name, _)| name == short) {
            return Ok(tip.clone());
        }
        if self.commits.contains_key(reference) {
            return Ok(reference.to_string());
        }
        Err(unknown_revision(reference))
    }

    /// `sha` and its ancestors, newest first.
    fn ancestry(&self, sha: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = Some(sha.to_string());
        while let Some(current) = next {
            next = self.commits.get(&current).and_then(|c| c.parent.clone());
            chain.push(current);
        }
        chain
    }

    fn commit_of(&self, sha: &str) -> Result<&FakeCommit, GitError> {
        self.commits.get(sha).ok_or_else(|| unknown_revision(sha))
    }
}

impl GitRepo for FakeGit {
    fn list_local_branches(&self) -> Result<Vec<String>, GitError> {
        Ok(self
            .branches
            .lock()
            .expect("fake branches mutex poisoned")
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn current_branch_name(&self) -> Result<String, GitError> {
        self.current.clone().ok_or(GitError::NotOnBranch)
    }

    fn merge_base(&self, left: &str, right: &str) -> Result<String, GitError> {
        let left_history: HashSet<String> =
            self.ancestry(&self.resolve(left)?).into_iter().collect();
        self.ancestry(&self.resolve(right)?)
            .into_iter()
            .find(|sha| left_history.contains(sha))
            .ok_or_else(|| GitError::NoCommonAncestor {
                left: left.to_string(),
                right: right.to_string(),
            })
    }

    fn rev_parse(&self, reference: &str) -> Result<String, GitError> {
        self.resolve(reference)
    }

    fn commits_between(&self, start: &str, end: &str) -> Result<Vec<String>, GitError> {
        let excluded: HashSet<String> = self.ancestry(&self.resolve(start)?).into_iter().collect();
        Ok(self
            .ancestry(&self.resolve(end)?)
            .into_iter()
            .filter(|sha| !excluded.contains(sha))
            .collect())
    }

    fn commit_subject(&self, sha: &str) -> Result<String, GitError> {
        Ok(self.commit_of(sha)?.subject.clone())
    }

    fn commit_show(&self, sha: &str) -> Result<String, GitError> {
        *self
            .show_calls
            .lock()
            .expect("fake show counter poisoned")
            .entry(sha.to_string())
            .or_default() += 1;
        let commit = self.commit_of(sha)?;
        Ok(format!(
            "commit {}\nAuthor: Test User <test@example.com>\n\n    {}\n\n{}",
            sha, commit.subject, commit.diff
        ))
    }

    fn combined_diff(&self, start: &str, end: &str) -> Result<String, GitError> {
        let mut commits = self.commits_between(start, end)?;
        commits.reverse();
        let diffs = commits
            .iter()
            .map(|sha| self.commit_of(sha).map(|c| c.diff.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(diffs.join("\n"))
    }

    fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        if self.undeletable_branches.contains(name) {
            return Err(GitError::CommandFailed {
                command: format!("branch -D {}", name),
                status: Some(1),
                stderr: format!("error: Cannot delete branch '{}'", name),
            });
        }
        let mut branches = self.branches.lock().expect("fake branches mutex poisoned");
        let before = branches.len();
        branches.retain(|(branch, _)| branch != name);
        if branches.len() == before {
            return Err(unknown_revision(name));
        }
        self.deleted
            .lock()
            .expect("fake deleted mutex poisoned")
            .push(name.to_string());
        Ok(())
    }
}
