// Branch sweep: classification, detection pass, deletion/advice pass

use crate::config::{Config, DeleteMode, Thresholds};
use crate::constants::TRUNK_BRANCHES;
use crate::detect::{MergeDetector, MergeVerdict};
use crate::git::{GitError, GitRepo};
use anyhow::Context;
use rayon::prelude::*;

/// How a branch relates to trunk once its verdict is weighed against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Tip is part of trunk history.
    CleanlyMerged,
    /// Rebased or squashed copy with an identical, non-trivial diff.
    Merged,
    /// Close enough to flag for a manual look, not to delete.
    PotentiallyMerged,
    NotMerged,
}

impl Disposition {
    #[must_use]
    pub fn is_deletable(self) -> bool {
        matches!(self, Disposition::CleanlyMerged | Disposition::Merged)
    }
}

#[must_use]
pub fn classify(verdict: Option<&MergeVerdict>, thresholds: &Thresholds) -> Disposition {
    let Some(verdict) = verdict else {
        return Disposition::NotMerged;
    };
    if verdict.exact {
        return Disposition::CleanlyMerged;
    }
    if verdict.subject_similarity <= thresholds.min_subject_score
        || verdict.diff_similarity <= thresholds.min_diff_score
    {
        return Disposition::NotMerged;
    }
    if verdict.diff_similarity == 1.0 && verdict.diff_size > thresholds.min_diff_size {
        Disposition::Merged
    } else {
        Disposition::PotentiallyMerged
    }
}

#[derive(Debug)]
pub enum BranchOutcome {
    /// The trunk branch itself; never compared.
    Trunk,
    Checked {
        verdict: Option<MergeVerdict>,
        disposition: Disposition,
    },
    Failed(GitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAction {
    None,
    Deleted,
    /// Interactive confirmation was refused.
    Declined,
    /// A shell snippet was printed instead.
    Advised,
}

#[derive(Debug)]
pub struct BranchReport {
    pub branch: String,
    pub outcome: BranchOutcome,
    pub action: SweepAction,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub branches: Vec<BranchReport>,
}

impl SweepReport {
    fn count(&self, action: SweepAction) -> usize {
        self.branches.iter().filter(|b| b.action == action).count()
    }

    pub fn deleted(&self) -> usize {
        self.count(SweepAction::Deleted)
    }

    pub fn advised(&self) -> usize {
        self.count(SweepAction::Advised)
    }

    pub fn declined(&self) -> usize {
        self.count(SweepAction::Declined)
    }

    pub fn failed(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| matches!(b.outcome, BranchOutcome::Failed(_)))
            .count()
    }

    /// Branches other than trunk that were looked at.
    pub fn checked(&self) -> usize {
        self.branches
            .iter()
            .filter(|b| !matches!(b.outcome, BranchOutcome::Trunk))
            .count()
    }
}

/// Hooks for presenting sweep progress and results.
///
/// Detection hooks may be called from worker threads; everything else runs
/// on the calling thread, in branch-listing order.
pub trait SweepCallbacks: Sync {
    fn on_detect_start(&self, _branch: &str) {}
    fn on_detect_complete(&self, _branch: &str, _outcome: &BranchOutcome) {}
    /// Called once between the detection pass and the action pass.
    fn on_detection_finished(&self) {}
    fn on_detect_failed(&self, branch: &str, error: &GitError);
    fn on_deleted(&self, verdict: &MergeVerdict, disposition: Disposition);
    fn on_advice(&self, verdict: &MergeVerdict, disposition: Disposition);
    /// Asked before each deletion in interactive mode.
    fn confirm_delete(&self, _verdict: &MergeVerdict, _disposition: Disposition) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Returns the checked-out branch, failing unless it is an accepted trunk name.
pub fn ensure_trunk<G: GitRepo + ?Sized>(git: &G) -> anyhow::Result<String> {
    let current = git
        .current_branch_name()
        .context("Failed to get current branch")?;
    if !TRUNK_BRANCHES.contains(&current.as_str()) {
        anyhow::bail!(
            "Unexpected current branch '{}'; check out one of {} first",
            current,
            TRUNK_BRANCHES.join(", ")
        );
    }
    Ok(current)
}

/// Checks every local branch against `trunk`, then deletes or reports the merged ones.
///
/// Detection runs first for all branches (on `config.jobs` threads); deletions
/// happen afterwards, one at a time. A failed comparison is recorded and
/// skipped. A failed deletion aborts the sweep.
pub fn sweep<G, C>(git: &G, trunk: &str, config: &Config, callbacks: &C) -> anyhow::Result<SweepReport>
where
    G: GitRepo + Sync + ?Sized,
    C: SweepCallbacks + ?Sized,
{
    let branches = git
        .list_local_branches()
        .context("Failed to list local branches")?;

    let detector = MergeDetector::new(git);
    let outcomes = detect_all(&detector, trunk, &branches, config, callbacks)?;
    callbacks.on_detection_finished();

    let mut report = SweepReport::default();
    for (branch, outcome) in branches.into_iter().zip(outcomes) {
        let action = act(git, &branch, &outcome, config, callbacks)?;
        report.branches.push(BranchReport {
            branch,
            outcome,
            action,
        });
    }
    Ok(report)
}

fn detect_all<G, C>(
    detector: &MergeDetector<'_, G>,
    trunk: &str,
    branches: &[String],
    config: &Config,
    callbacks: &C,
) -> anyhow::Result<Vec<BranchOutcome>>
where
    G: GitRepo + Sync + ?Sized,
    C: SweepCallbacks + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.max(1))
        .build()
        .context("Failed to build detection thread pool")?;

    Ok(pool.install(|| {
        branches
            .par_iter()
            .map(|branch| detect_one(detector, trunk, branch, &config.thresholds, callbacks))
            .collect()
    }))
}

fn detect_one<G, C>(
    detector: &MergeDetector<'_, G>,
    trunk: &str,
    branch: &str,
    thresholds: &Thresholds,
    callbacks: &C,
) -> BranchOutcome
where
    G: GitRepo + ?Sized,
    C: SweepCallbacks + ?Sized,
{
    if branch == trunk {
        return BranchOutcome::Trunk;
    }

    callbacks.on_detect_start(branch);
    let outcome = match detector.detect_merge(trunk, branch) {
        Ok(verdict) => {
            let disposition = classify(verdict.as_ref(), thresholds);
            BranchOutcome::Checked {
                verdict,
                disposition,
            }
        }
        Err(error) => BranchOutcome::Failed(error),
    };
    callbacks.on_detect_complete(branch, &outcome);
    outcome
}

fn act<G, C>(
    git: &G,
    branch: &str,
    outcome: &BranchOutcome,
    config: &Config,
    callbacks: &C,
) -> anyhow::Result<SweepAction>
where
    G: GitRepo + ?Sized,
    C: SweepCallbacks + ?Sized,
{
    let (verdict, disposition) = match outcome {
        BranchOutcome::Trunk => return Ok(SweepAction::None),
        BranchOutcome::Failed(error) => {
            callbacks.on_detect_failed(branch, error);
            return Ok(SweepAction::None);
        }
        BranchOutcome::Checked {
            verdict: Some(verdict),
            disposition,
        } => (verdict, *disposition),
        BranchOutcome::Checked { verdict: None, .. } => return Ok(SweepAction::None),
    };

    if disposition.is_deletable() {
        match config.delete_mode {
            DeleteMode::DryRun => {
                callbacks.on_advice(verdict, disposition);
                return Ok(SweepAction::Advised);
            }
            DeleteMode::Interactive => {
                if !callbacks.confirm_delete(verdict, disposition)? {
                    return Ok(SweepAction::Declined);
                }
            }
            DeleteMode::Auto => {}
        }
        git.delete_branch(&verdict.branch)
            .with_context(|| format!("Failed to delete branch '{}'", verdict.branch))?;
        callbacks.on_deleted(verdict, disposition);
        return Ok(SweepAction::Deleted);
    }

    if disposition == Disposition::PotentiallyMerged && !config.perfect_only {
        callbacks.on_advice(verdict, disposition);
        return Ok(SweepAction::Advised);
    }
    Ok(SweepAction::None)
}
