//! Per-run cache of commit subjects and normalized diffs.
//!
//! Every trunk commit since a branch's merge base is fingerprinted once per
//! candidate branch, so the same shas come up again and again in one sweep.

use crate::git::{GitError, GitRepo};
use crate::normalize::{diff_portion, normalize_diff};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What the merge detector compares for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFingerprint {
    pub sha: String,
    /// First line of the commit message.
    pub subject: String,
    pub normalized_diff: String,
}

impl CommitFingerprint {
    fn compute<G: GitRepo + ?Sized>(git: &G, sha: &str) -> Result<Self, GitError> {
        let subject = git.commit_subject(sha)?;
        let show = git.commit_show(sha)?;
        Ok(Self {
            sha: sha.to_string(),
            subject,
            normalized_diff: normalize_diff(diff_portion(&show)),
        })
    }
}

type Slot = Arc<Mutex<Option<Arc<CommitFingerprint>>>>;

/// Memoizes [`CommitFingerprint`]s by sha for the lifetime of one run.
///
/// Each sha gets its own slot. The first caller computes while holding the
/// slot lock; concurrent callers for the same sha block on it and then reuse
/// the result. Failed computations leave the slot empty.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint_of<G: GitRepo + ?Sized>(
        &self,
        git: &G,
        sha: &str,
    ) -> Result<Arc<CommitFingerprint>, GitError> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .expect("FingerprintCache slots mutex poisoned");
            Arc::clone(slots.entry(sha.to_string()).or_default())
        };

        let mut entry = slot.lock().expect("FingerprintCache slot mutex poisoned");
        if let Some(fingerprint) = entry.as_ref() {
            return Ok(Arc::clone(fingerprint));
        }

        let fingerprint = Arc::new(CommitFingerprint::compute(git, sha)?);
        *entry = Some(Arc::clone(&fingerprint));
        Ok(fingerprint)
    }

    /// Number of fingerprints computed so far.
    pub fn len(&self) -> usize {
        let slots = self
            .slots
            .lock()
            .expect("FingerprintCache slots mutex poisoned");
        slots
            .values()
            .filter(|slot| {
                slot.lock()
                    .expect("FingerprintCache slot mutex poisoned")
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
