//! Parallel candidate evaluation and best-model selection.
//!
//! Every candidate is fitted independently on a dedicated rayon pool sized by
//! `num_threads`. Results are folded per worker and then reduced; nothing
//! collects the full result set, so grid searches over very large spaces run
//! in constant memory.
//!
//! Selection rules:
//! 1. Rejected candidates (non-finite design matrix, non-finite error) never win.
//! 2. The minimum mean squared error wins.
//! 3. Exact ties go to the candidate generated first (lowest rank). Because the
//!    rank travels with each result, the winner does not depend on completion
//!    order.

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::{Dataset, FitResult, SearchConfig, SearchOutcome, SearchStrategy};
use crate::error::AppError;
use crate::fit::fitter::Evaluator;
use crate::fit::grid::GridCombinations;
use crate::fit::random::sample_random_combinations;
use crate::math::ols::LinearFit;
use crate::models::BasisSpace;

/// Grid sizes above this get a warning suggesting random search.
const LARGE_GRID_WARNING: u128 = 10_000_000;

/// Running reduction state: counts plus the best candidate seen so far.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub evaluated: u128,
    pub rejected: u128,
    pub best: Option<(u128, FitResult)>,
}

impl Tally {
    /// Account for one candidate result with generation rank `rank`.
    pub fn push(mut self, rank: u128, result: FitResult) -> Self {
        self.evaluated += 1;
        if !result.is_usable() {
            self.rejected += 1;
            return self;
        }
        let replace = match &self.best {
            None => true,
            Some((best_rank, best)) => beats(result.error, rank, best.error, *best_rank),
        };
        if replace {
            self.best = Some((rank, result));
        }
        self
    }

    /// Combine two partial tallies.
    pub fn merge(mut self, other: Tally) -> Self {
        self.evaluated += other.evaluated;
        self.rejected += other.rejected;
        self.best = match (self.best, other.best) {
            (None, b) | (b, None) => b,
            (Some(a), Some(b)) => {
                if beats(b.1.error, b.0, a.1.error, a.0) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
        };
        self
    }
}

fn beats(error: f64, rank: u128, best_error: f64, best_rank: u128) -> bool {
    error < best_error || (error == best_error && rank < best_rank)
}

/// Run the configured search over `space` and return the outcome.
///
/// An outcome with `best == None` is returned as-is; turning it into a
/// "no model found" error is the caller's decision.
pub fn run_search<F: LinearFit + ?Sized>(
    space: &BasisSpace,
    dataset: &Dataset,
    config: &SearchConfig,
    fitter: &F,
) -> Result<SearchOutcome, AppError> {
    config.validate()?;
    let evaluator = Evaluator::new(space, dataset, fitter)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()
        .map_err(|e| AppError::invalid_input(format!("Failed to build thread pool: {e}")))?;

    let tally = match config.strategy {
        SearchStrategy::Grid => {
            let grid = GridCombinations::new(space.len(), config.num_terms)?;
            let total = grid.total();
            info!(
                "grid search: {total} combinations of {} terms over {} basis functions",
                config.num_terms,
                space.len()
            );
            if total > LARGE_GRID_WARNING {
                warn!("grid has {total} combinations; consider --strategy random");
            }
            let progress = progress_bar(config.progress, total);
            let tally = pool.install(|| reduce(grid.par_bridge(), &evaluator, &progress))?;
            progress.finish_and_clear();
            tally
        }
        SearchStrategy::Random => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let samples =
                sample_random_combinations(&mut rng, space.len(), config.num_terms, config.num_samples);
            info!(
                "random search: {} samples of 1..={} terms over {} basis functions",
                samples.len(),
                config.num_terms,
                space.len()
            );
            let progress = progress_bar(config.progress, samples.len() as u128);
            let tally = pool.install(|| reduce(samples.into_par_iter(), &evaluator, &progress))?;
            progress.finish_and_clear();
            tally
        }
    };

    info!(
        "evaluated {} candidates ({} rejected as non-finite)",
        tally.evaluated, tally.rejected
    );

    let (best_index, best) = match tally.best {
        Some((rank, result)) => (Some(rank), Some(result)),
        None => (None, None),
    };
    Ok(SearchOutcome {
        strategy: config.strategy,
        evaluated: tally.evaluated,
        rejected: tally.rejected,
        best,
        best_index,
    })
}

fn reduce<I, F>(candidates: I, evaluator: &Evaluator<'_, F>, progress: &ProgressBar) -> Result<Tally, AppError>
where
    I: ParallelIterator<Item = (u128, Vec<u128>)>,
    F: LinearFit + ?Sized,
{
    candidates
        .map(|(rank, indices)| evaluator.evaluate_indices(indices).map(|r| (rank, r)))
        .try_fold(Tally::default, |tally, item| {
            let (rank, result) = item?;
            progress.inc(1);
            Ok::<_, AppError>(tally.push(rank, result))
        })
        .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))
}

fn progress_bar(enabled: bool, total: u128) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} candidates ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}
