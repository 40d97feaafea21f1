//! Random traversal of basis combinations.
//!
//! Each sample draws a term count uniformly from `1..=num_terms` (capped at
//! the size of the space), then that many distinct N-D basis indices
//! uniformly without replacement.
//!
//! Memory: for spaces of at most [`MATERIALIZE_LIMIT`] functions we use
//! `rand::seq::index::sample`, which may allocate an index buffer as large as
//! the space. Above the limit we switch to Floyd's algorithm, which only
//! stores the indices it returns.

use rand::Rng;
use rand::seq::index;

/// Largest space for which an index buffer of the whole space is acceptable.
pub const MATERIALIZE_LIMIT: u128 = 1 << 20;

/// Draw `num_samples` combinations from a space of `space_len` functions.
///
/// Items are `(sample_number, sorted_indices)`. Returns no samples if the
/// space is empty or `num_terms == 0`.
pub fn sample_random_combinations<R: Rng + ?Sized>(
    rng: &mut R,
    space_len: u128,
    num_terms: usize,
    num_samples: usize,
) -> Vec<(u128, Vec<u128>)> {
    let max_terms = (num_terms as u128).min(space_len) as usize;
    if max_terms == 0 {
        return Vec::new();
    }

    (0..num_samples)
        .map(|i| {
            let terms = rng.gen_range(1..=max_terms);
            let mut indices = sample_distinct(rng, space_len, terms);
            indices.sort_unstable();
            (i as u128, indices)
        })
        .collect()
}

/// `amount` distinct indices drawn uniformly from `0..len` (at most `len` of them).
pub fn sample_distinct<R: Rng + ?Sized>(rng: &mut R, len: u128, amount: usize) -> Vec<u128> {
    let amount = (amount as u128).min(len) as usize;
    if len <= MATERIALIZE_LIMIT {
        return index::sample(rng, len as usize, amount)
            .into_iter()
            .map(|i| i as u128)
            .collect();
    }

    // Floyd: for j in len-amount..len, pick t in 0..=j; take j if t was already taken.
    let mut chosen: Vec<u128> = Vec::with_capacity(amount);
    for j in (len - amount as u128)..len {
        let t = rng.gen_range(0..=j);
        if chosen.contains(&t) {
            chosen.push(j);
        } else {
            chosen.push(t);
        }
    }
    chosen
}
