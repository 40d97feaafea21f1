//! Exhaustive (grid) traversal of basis combinations.
//!
//! The grid is every `k`-subset of the N-D basis space, in lexicographic order
//! over generation indices: `[0, 1]`, `[0, 2]`, ..., `[1, 2]`, ...
//!
//! The space is usually far too large to hold in memory, so the iterator keeps
//! only the current `k` indices and advances with the standard "next
//! combination" step. Any position can be reached directly with
//! [`GridCombinations::nth_combination`] (unranking via the combinatorial
//! number system, binary-searching each position), which also backs
//! `Iterator::nth`.

use crate::error::AppError;
use crate::math::combinatorics::choose;

/// Lazy iterator over `(rank, indices)` for every `k`-subset of `0..n`.
#[derive(Debug, Clone)]
pub struct GridCombinations {
    n: u128,
    k: usize,
    len: u128,
    /// Rank of `current`.
    rank: u128,
    current: Option<Vec<u128>>,
}

impl GridCombinations {
    /// All `k`-subsets of a space with `n` functions.
    ///
    /// Errors only if the number of subsets does not fit in `u128`.
    pub fn new(n: u128, k: usize) -> Result<Self, AppError> {
        let len = choose(n, k as u128).ok_or_else(|| {
            AppError::invalid_input(format!(
                "C({n}, {k}) grid combinations cannot be counted in 128 bits; use random search."
            ))
        })?;
        let current = (len > 0).then(|| (0..k as u128).collect());
        Ok(Self {
            n,
            k,
            len,
            rank: 0,
            current,
        })
    }

    /// Total number of combinations (not just the remaining ones).
    pub fn total(&self) -> u128 {
        self.len
    }

    /// Combinations not yet yielded.
    pub fn remaining(&self) -> u128 {
        if self.current.is_some() {
            self.len - self.rank
        } else {
            0
        }
    }

    /// The combination at `rank`, without iterating up to it.
    ///
    /// Each position is found by binary search over its candidate values, so
    /// the cost is `O(k log n)` binomials regardless of how large `n` is.
    pub fn nth_combination(&self, rank: u128) -> Option<Vec<u128>> {
        if rank >= self.len {
            return None;
        }
        let n = self.n;
        let mut out = Vec::with_capacity(self.k);
        let mut rank = rank;
        let mut lo: u128 = 0;
        for pos in 0..self.k {
            // Elements still to place, including this one.
            let take = (self.k - pos) as u128;
            let total = choose(n - lo, take)?;
            // Combinations whose element at `pos` is below `c`.
            let skipped = |c: u128| choose(n - c, take).map(|rest| total - rest);

            let (mut a, mut b) = (lo, n - take);
            while a < b {
                let mid = a + (b - a + 1) / 2;
                if skipped(mid)? <= rank {
                    a = mid;
                } else {
                    b = mid - 1;
                }
            }
            rank -= skipped(a)?;
            out.push(a);
            lo = a + 1;
        }
        Some(out)
    }

    fn advance(&mut self) {
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        let k = cur.len();
        let n = self.n;
        // Rightmost position that can still move right.
        let Some(i) = (0..k).rev().find(|&i| cur[i] < n - (k - i) as u128) else {
            self.current = None;
            return;
        };
        cur[i] += 1;
        for j in (i + 1)..k {
            cur[j] = cur[j - 1] + 1;
        }
        self.rank += 1;
    }
}

impl Iterator for GridCombinations {
    type Item = (u128, Vec<u128>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = (self.rank, self.current.clone()?);
        self.advance();
        Some(item)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let target = self.rank.checked_add(n as u128)?;
        if self.current.is_none() || target >= self.len {
            self.current = None;
            return None;
        }
        self.current = self.nth_combination(target);
        self.rank = target;
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        match usize::try_from(remaining) {
            Ok(r) => (r, Some(r)),
            Err(_) => (usize::MAX, None),
        }
    }
}
