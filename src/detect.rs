//! Merge detection.
//!
//! Decides whether a branch's work already exists on trunk even when the
//! branch was rebased or squashed and its commit SHAs never reached trunk.
//! Scoring is two-staged: commit subjects pick the single most likely trunk
//! commit, then only that commit's diff is compared in full.

use crate::fingerprint::{CommitFingerprint, FingerprintCache};
use crate::git::{GitError, GitRepo, branch_ref};
use crate::normalize::normalize_diff;
use crate::similarity::jaro_winkler;
use std::sync::Arc;

/// Outcome of comparing one branch against trunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeVerdict {
    pub branch: String,
    pub merge_base: String,
    /// Trunk commit whose subject best matched; `None` for exact merges.
    pub matched_commit: Option<String>,
    /// The branch tip is already part of trunk's history.
    pub exact: bool,
    pub subject_similarity: f64,
    pub diff_similarity: f64,
    /// Characters in the branch-side diff that was compared.
    pub diff_size: usize,
    /// Commits on the branch since the merge base.
    pub commit_count: usize,
    /// Shell command for comparing the two sides by hand. Display only.
    pub comparison_command: Option<String>,
}

impl MergeVerdict {
    fn exact(branch: &str, merge_base: String) -> Self {
        Self {
            branch: branch.to_string(),
            merge_base,
            matched_commit: None,
            exact: true,
            subject_similarity: 1.0,
            diff_similarity: 1.0,
            diff_size: 0,
            commit_count: 0,
            comparison_command: None,
        }
    }
}

/// Compares branches against trunk, sharing one fingerprint cache across calls.
pub struct MergeDetector<'a, G: GitRepo + ?Sized> {
    git: &'a G,
    cache: FingerprintCache,
}

impl<'a, G: GitRepo + ?Sized> MergeDetector<'a, G> {
    pub fn new(git: &'a G) -> Self {
        Self {
            git,
            cache: FingerprintCache::new(),
        }
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// Returns `Ok(None)` when trunk has no commits since the merge base, meaning
    /// there is nothing to match against (not proof the branch is unmerged).
    ///
    /// # Panics
    ///
    /// If the branch tip differs from the merge base yet the adapter reports no
    /// commits between them.
    pub fn detect_merge(
        &self,
        trunk: &str,
        candidate: &str,
    ) -> Result<Option<MergeVerdict>, GitError> {
        let trunk_ref = branch_ref(trunk);
        let candidate_ref = branch_ref(candidate);
        let base = self.git.merge_base(&trunk_ref, &candidate_ref)?;
        let tip = self.git.rev_parse(&candidate_ref)?;
        if tip == base {
            return Ok(Some(MergeVerdict::exact(candidate, base)));
        }

        let branch_commits = self.git.commits_between(&base, &candidate_ref)?;
        let Some(earliest) = branch_commits.last() else {
            panic!(
                "branch '{}' has tip {} distinct from merge base {} but no commits in between",
                candidate, tip, base
            );
        };
        let representative = self.cache.fingerprint_of(self.git, earliest)?;

        let trunk_commits = self.git.commits_between(&base, &trunk_ref)?;
        let Some((best, subject_similarity)) =
            self.best_subject_match(&representative.subject, &trunk_commits)?
        else {
            return Ok(None);
        };

        let (diff_similarity, diff_size, comparison_command) = if branch_commits.len() > 1 {
            let branch_diff = normalize_diff(&self.git.combined_diff(&base, &candidate_ref)?);
            let parent = format!("{}^", best.sha);
            let trunk_diff = normalize_diff(&self.git.combined_diff(&parent, &best.sha)?);
            (
                jaro_winkler(&branch_diff, &trunk_diff),
                branch_diff.chars().count(),
                format!(
                    "meld <(git diff {}..{}) <(git diff {}^..{})",
                    base, candidate_ref, best.sha, best.sha
                ),
            )
        } else {
            (
                jaro_winkler(&representative.normalized_diff, &best.normalized_diff),
                representative.normalized_diff.chars().count(),
                format!("meld <(git show {}) <(git show {})", candidate_ref, best.sha),
            )
        };

        Ok(Some(MergeVerdict {
            branch: candidate.to_string(),
            merge_base: base,
            matched_commit: Some(best.sha.clone()),
            exact: false,
            subject_similarity,
            diff_similarity,
            diff_size,
            commit_count: branch_commits.len(),
            comparison_command: Some(comparison_command),
        }))
    }

    /// The trunk commit whose subject scores highest; the first one wins ties.
    fn best_subject_match(
        &self,
        subject: &str,
        trunk_commits: &[String],
    ) -> Result<Option<(Arc<CommitFingerprint>, f64)>, GitError> {
        let mut best: Option<(Arc<CommitFingerprint>, f64)> = None;
        for sha in trunk_commits {
            let fingerprint = self.cache.fingerprint_of(self.git, sha)?;
            let score = jaro_winkler(subject, &fingerprint.subject);
            if best.as_ref().is_none_or(|(_, top)| score > *top) {
                best = Some((fingerprint, score));
            }
        }
        Ok(best)
    }
}
