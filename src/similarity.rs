//! Jaro and Jaro-Winkler string similarity.

use crate::constants::{WINKLER_MAX_PREFIX, WINKLER_PREFIX_SCALE};

/// Jaro similarity in `[0, 1]`.
///
/// Inputs are put in a canonical order first so the greedy matching gives the
/// same score whichever way round the strings are passed.
pub fn jaro(left: &str, right: &str) -> f64 {
    if left == right {
        return 1.0;
    }
    let (short, long) = if (left.len(), left) <= (right.len(), right) {
        (left, right)
    } else {
        (right, left)
    };
    let a: Vec<char> = short.chars().collect();
    let b: Vec<char> = long.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ch) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ch {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut half_transpositions = 0usize;
    let mut k = 0usize;
    for (i, ch) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ch != b[k] {
            half_transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = half_transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity in `[0, 1]`, boosting pairs that share a prefix.
pub fn jaro_winkler(left: &str, right: &str) -> f64 {
    let jaro = jaro(left, right);
    let prefix = left
        .chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .take(WINKLER_MAX_PREFIX)
        .count();
    jaro + prefix as f64 * WINKLER_PREFIX_SCALE * (1.0 - jaro)
}
