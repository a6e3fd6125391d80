//! Ratcliff/Obershelp similarity for short strings.
//!
//! The longest common block is found first, then the unmatched left and
//! right remainders are searched the same way. The recursion is unrolled
//! onto an explicit stack so long inputs cannot overflow.

use super::tokenizer::fold_char;

/// Similarity in [0.0, 1.0] between two strings, case-insensitive.
///
/// Computed as `2 * matched / (len(a) + len(b))`. Returns 0.0 when either
/// side is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().map(fold_char).collect();
    let b: Vec<char> = b.chars().map(fold_char).collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matched = matched_chars(&a, &b);
    (2 * matched) as f64 / (a.len() + b.len()) as f64
}

/// Distance in [0.0, 1.0], the complement of [`similarity`].
///
/// An empty side is always maximally distant.
pub fn distance(a: &str, b: &str) -> f64 {
    1.0 - similarity(a, b)
}

/// Total length of all matching blocks between `a` and `b`
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut stack = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = stack.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;

        if alo < i && blo < j {
            stack.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            stack.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, k)` with `a[i..i+k] == b[j..j+k]`. Among blocks of equal
/// length the one starting earliest in `a`, then in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    // curr[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j] + 1;
                curr[j + 1] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                curr[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_k)
}
