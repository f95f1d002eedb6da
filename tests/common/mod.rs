//! Test infrastructure for git-sweep-rust integration tests.

#![allow(dead_code)]

use anyhow::Result;
use git_sweep_rust::git::{CliGit, no_op_logger, run_git};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary git repository for testing.
/// Automatically cleaned up when dropped.
pub struct TestRepo {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// Creates a new test repository with an initial commit on the `main` branch.
    pub fn new() -> Result<Self> {
        Self::with_trunk("main")
    }

    pub fn with_trunk(trunk: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();

        run_git(&path, &["init", "-b", trunk])?;
        run_git(&path, &["config", "user.email", "test@example.com"])?;
        run_git(&path, &["config", "user.name", "Test User"])?;
        run_git(&path, &["config", "commit.gpgsign", "false"])?;

        let repo = Self {
            _temp_dir: temp_dir,
            path,
        };
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit")?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git(&self, args: &[&str]) -> Result<String> {
        Ok(run_git(&self.path, args)?)
    }

    /// An adapter over this repository that logs nothing.
    pub fn cli(&self) -> CliGit {
        CliGit::new(&self.path, no_op_logger)
    }

    /// Writes `contents` to `file`, commits it and returns the new HEAD sha.
    pub fn commit_file(&self, file: &str, contents: &str, message: &str) -> Result<String> {
        let target = self.path.join(file);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, contents)?;
        self.git(&["add", file])?;
        self.git(&["commit", "-m", message])?;
        self.head()
    }

    pub fn head(&self) -> Result<String> {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch])?;
        Ok(())
    }

    pub fn checkout_new(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "-b", branch])?;
        Ok(())
    }

    pub fn branch_exists(&self, branch: &str) -> Result<bool> {
        let output = self.git(&["branch", "--list", branch])?;
        Ok(!output.trim().is_empty())
    }
}

/// Numbered lines so edits produce realistic multi-line hunks.
pub fn numbered_lines(prefix: &str, count: usize) -> String {
    (1..=count)
        .map(|n| format!("{} line {}\n", prefix, n))
        .collect()
}

/// main: initial commit plus `src/login.rs`, then a `feature` branch with
/// "fix login bug", then an unrelated trunk commit and a cherry-pick of the
/// fix (a rebase-merge). Leaves `main` checked out. Returns the cherry-picked sha.
pub fn rebase_merged_feature(repo: &TestRepo) -> Result<String> {
    let original = numbered_lines("login", 20);
    repo.commit_file("src/login.rs", &original, "Add login module")?;

    repo.checkout_new("feature")?;
    let fixed = original.replace("login line 12\n", "login line 12 (token expiry checked)\n");
    repo.commit_file("src/login.rs", &fixed, "fix login bug")?;

    repo.checkout("main")?;
    repo.commit_file("docs/guide.md", &numbered_lines("guide", 5), "Update docs")?;
    repo.git(&["cherry-pick", "feature"])?;
    repo.head()
}

/// A three-commit `parser` branch squash-merged into main. Returns the squash commit sha.
pub fn squash_merged_parser(repo: &TestRepo) -> Result<String> {
    repo.checkout_new("parser")?;
    let mut contents = numbered_lines("parser", 10);
    repo.commit_file("src/parser.rs", &contents, "Add parser")?;
    contents.push_str("fn parse_parens() {}\n");
    repo.commit_file("src/parser.rs", &contents, "Handle parentheses")?;
    contents = contents.replace("parser line 3\n", "parser line 3 (reviewed)\n");
    repo.commit_file("src/parser.rs", &contents, "Review fixes")?;

    repo.checkout("main")?;
    repo.commit_file("CHANGELOG.md", "## 0.2.0\n", "Start changelog")?;
    repo.git(&["merge", "--squash", "parser"])?;
    repo.git(&["commit", "-m", "Add parser (#12)"])?;
    repo.head()
}
