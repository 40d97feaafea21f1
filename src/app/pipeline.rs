//! Shared search pipeline: data -> basis space -> search -> outcome.
//!
//! The CLI handlers focus on printing; everything that computes lives here so
//! it can be driven from tests with an in-memory dataset.

use std::path::Path;

use log::info;

use crate::domain::{Dataset, SearchConfig, SearchOutcome};
use crate::error::AppError;
use crate::fit::selection::run_search;
use crate::io::ingest::load_dataset;
use crate::math::ols::OrdinaryLeastSquares;
use crate::models::BasisSpace;
use crate::report::{Residual, compute_residuals, largest_residuals};

/// All computed outputs of a single `cxs search` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub dataset: Dataset,
    pub outcome: SearchOutcome,
    /// Largest residuals of the best model (empty unless requested).
    pub residuals: Vec<Residual>,
}

/// Load the CSV at `path` and search it.
pub fn run_search_file(path: &Path, config: &SearchConfig, top_n: usize) -> Result<RunOutput, AppError> {
    let dataset = load_dataset(path)?;
    run_search_on(dataset, config, top_n)
}

/// Search an in-memory dataset.
///
/// A search that yields no usable model is an error (exit code 3).
pub fn run_search_on(dataset: Dataset, config: &SearchConfig, top_n: usize) -> Result<RunOutput, AppError> {
    config.validate()?;
    let space = BasisSpace::new(
        dataset.num_dimensions(),
        &config.p_values,
        &config.q_values,
        &config.x_values,
    )?;
    info!(
        "{} 1-D basis functions, {} {}-D basis functions",
        space.one_d().len(),
        space.len(),
        space.num_dimensions()
    );

    let outcome = run_search(&space, &dataset, config, &OrdinaryLeastSquares)?;
    let Some(best) = outcome.best.as_ref() else {
        return Err(AppError::no_model(format!(
            "No model found: {} candidates evaluated, {} rejected as non-finite.",
            outcome.evaluated, outcome.rejected
        )));
    };

    let residuals = if top_n > 0 {
        largest_residuals(&compute_residuals(&dataset, best)?, top_n)
    } else {
        Vec::new()
    };

    Ok(RunOutput {
        dataset,
        outcome,
        residuals,
    })
}
