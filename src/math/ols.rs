//! Ordinary least squares with an intercept.
//!
//! Every candidate model is a linear regression:
//!
//! ```text
//! minimize Σ (y_i - (β0 + x_i^T β))^2
//! ```
//!
//! where the columns of `x` are evaluated basis functions. The search only
//! needs "fit a linear model to a design matrix", so that capability sits
//! behind the [`LinearFit`] trait and [`OrdinaryLeastSquares`] is the default.
//!
//! Implementation choices:
//! - Columns and targets are centered first; the intercept is recovered as
//!   `ȳ - x̄ᵀβ`.
//! - The centered problem is solved with SVD, zeroing singular values below
//!   `σ_max · max(rows, cols) · ε` (the usual numpy/LAPACK cutoff). Collinear
//!   or constant columns therefore get the minimum-norm solution instead of
//!   failing.

use std::fmt;

use nalgebra::{DMatrix, DVector};

/// Failure modes of a linear fit.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// The design matrix contains NaN or ±inf.
    NonFiniteInput,
    /// The target vector contains NaN or ±inf.
    NonFiniteTargets,
    /// Dimensions of the design matrix and targets disagree (or are empty).
    Shape { rows: usize, cols: usize, targets: usize },
    /// The solver could not produce finite coefficients.
    Solver(String),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::NonFiniteInput => write!(f, "design matrix contains infinity or NaN"),
            FitError::NonFiniteTargets => write!(f, "targets contain infinity or NaN"),
            FitError::Shape { rows, cols, targets } => write!(
                f,
                "design matrix is {rows}x{cols} but there are {targets} targets"
            ),
            FitError::Solver(msg) => write!(f, "least squares solve failed: {msg}"),
        }
    }
}

impl std::error::Error for FitError {}

/// A fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    /// One coefficient per design-matrix column.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// In-sample predictions, one per target.
    pub predictions: Vec<f64>,
}

impl LinearModel {
    /// Predict for a single row of basis values.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Capability: fit a linear model (with intercept) to a design matrix.
///
/// Implementations must return [`FitError::NonFiniteInput`] when the design
/// matrix contains NaN or ±inf; the search treats that error as a rejected
/// candidate and every other error as fatal.
pub trait LinearFit: Sync {
    fn fit(&self, design: &DMatrix<f64>, targets: &DVector<f64>) -> Result<LinearModel, FitError>;
}

/// SVD-based ordinary least squares.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinaryLeastSquares;

impl LinearFit for OrdinaryLeastSquares {
    fn fit(&self, design: &DMatrix<f64>, targets: &DVector<f64>) -> Result<LinearModel, FitError> {
        let (rows, cols) = design.shape();
        if rows == 0 || cols == 0 || rows != targets.len() {
            return Err(FitError::Shape {
                rows,
                cols,
                targets: targets.len(),
            });
        }
        if design.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteInput);
        }
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonFiniteTargets);
        }

        let means: Vec<f64> = design.column_iter().map(|c| c.mean()).collect();
        let y_mean = targets.mean();

        let mut centered = design.clone();
        for (j, mut col) in centered.column_iter_mut().enumerate() {
            col.add_scalar_mut(-means[j]);
        }
        let y_centered = targets.add_scalar(-y_mean);

        let beta = solve_least_squares(&centered, &y_centered)?;
        let intercept = y_mean - beta.dot(&DVector::from_vec(means));
        if !intercept.is_finite() {
            return Err(FitError::Solver("non-finite intercept".to_string()));
        }

        let predictions = (design * &beta).add_scalar(intercept);

        Ok(LinearModel {
            coefficients: beta.iter().copied().collect(),
            intercept,
            predictions: predictions.iter().copied().collect(),
        })
    }
}

/// Solve `min ||x β - y||` with SVD and a relative singular-value cutoff.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, FitError> {
    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let dim = x.nrows().max(x.ncols()) as f64;
    let tol = (sigma_max * dim * f64::EPSILON).max(f64::MIN_POSITIVE);

    let beta = svd
        .solve(y, tol)
        .map_err(|e| FitError::Solver(e.to_string()))?;
    if beta.iter().all(|v| v.is_finite()) {
        Ok(beta)
    } else {
        Err(FitError::Solver("non-finite coefficients".to_string()))
    }
}

/// Mean squared error between `predictions` and `targets`.
pub fn mean_squared_error(targets: &[f64], predictions: &[f64]) -> f64 {
    if targets.is_empty() {
        return f64::NAN;
    }
    let sse: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(y, p)| (y - p) * (y - p))
        .sum();
    sse / targets.len() as f64
}
