//! Diff normalization.
//!
//! Rebasing or squashing a change rewrites blob hashes and shifts hunk
//! offsets without touching the content. Masking those tokens lets two
//! renderings of the same change compare as equal.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const SOURCE_PLACEHOLDER: &str = "aaaaaaa";
const DEST_PLACEHOLDER: &str = "bbbbbbb";
const ZERO_PLACEHOLDER: &str = "0000000";
const HUNK_RANGE_PLACEHOLDER: &str = "-0,0 +0,0";

// `index <src>[,<src>...]..<dst>[ <mode>]`; several sources appear in combined (merge) diffs.
static INDEX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^index ([0-9a-f]+(?:,[0-9a-f]+)*)\.\.([0-9a-f]+)(.*)$").expect("invalid regex")
});

// `@@ -a,b +c,d @@ <context>`, or `@@@ ... @@@` for combined diffs.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(@{2,}) (?:[-+]\d+(?:,\d+)? )+(@{2,})(.*)$").expect("invalid regex")
});

fn is_zero_hash(hash: &str) -> bool {
    hash.bytes().all(|b| b == b'0')
}

fn mask_hash(hash: &str, placeholder: &'static str) -> &'static str {
    if is_zero_hash(hash) {
        ZERO_PLACEHOLDER
    } else {
        placeholder
    }
}

fn normalize_index_line(caps: &Captures<'_>) -> String {
    let sources: Vec<&str> = caps[1]
        .split(',')
        .map(|hash| mask_hash(hash, SOURCE_PLACEHOLDER))
        .collect();
    format!(
        "index {}..{}{}",
        sources.join(","),
        mask_hash(&caps[2], DEST_PLACEHOLDER),
        &caps[3]
    )
}

fn normalize_line(line: &str) -> String {
    if let Some(caps) = INDEX_LINE.captures(line) {
        return normalize_index_line(&caps);
    }
    if let Some(caps) = HUNK_HEADER.captures(line) {
        return format!(
            "{} {} {}{}",
            &caps[1], HUNK_RANGE_PLACEHOLDER, &caps[2], &caps[3]
        );
    }
    line.to_string()
}

/// Masks blob hashes and hunk offsets in a unified diff.
///
/// New and deleted files keep their all-zero side so they stay distinct from
/// modifications. Every other line passes through untouched. The transform
/// is idempotent.
pub fn normalize_diff(diff: &str) -> String {
    diff.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the diff part of a `git show` rendering, dropping the commit header
/// and message. Empty when the commit changes nothing.
pub fn diff_portion(show: &str) -> &str {
    if show.starts_with("diff ") {
        return show;
    }
    match show.find("\ndiff ") {
        Some(pos) => &show[pos + 1..],
        None => "",
    }
}
