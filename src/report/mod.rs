//! Reporting utilities: residuals, space counts, and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Dataset, FitResult};
use crate::error::AppError;
use crate::math::combinatorics::{
    count_1d_basis_functions, count_basis_function_combinations, count_elementary, count_nd_basis_functions,
};
use crate::models::predict;

/// One measurement with its fitted value.
#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    /// 1-based data row.
    pub row: usize,
    pub features: Vec<f64>,
    pub observed: f64,
    pub fitted: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for every row of `dataset`.
pub fn compute_residuals(dataset: &Dataset, fit: &FitResult) -> Result<Vec<Residual>, AppError> {
    let (Some(model), Some(basis)) = (&fit.model, &fit.basis) else {
        return Err(AppError::no_model("Cannot compute residuals without a fitted model."));
    };
    let fitted = predict(model, basis, dataset)?;

    let mut out = Vec::with_capacity(dataset.num_rows());
    for (i, (&observed, &fitted)) in dataset.targets().iter().zip(&fitted).enumerate() {
        if !fitted.is_finite() {
            return Err(AppError::fit_failure(format!(
                "Non-finite prediction for row {} during residual computation.",
                i + 1
            )));
        }
        out.push(Residual {
            row: i + 1,
            features: dataset.columns().iter().map(|c| c[i]).collect(),
            observed,
            fitted,
            residual: observed - fitted,
        });
    }
    Ok(out)
}

/// The `top_n` residuals with the largest magnitude, largest first.
pub fn largest_residuals(residuals: &[Residual], top_n: usize) -> Vec<Residual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.residual.abs().total_cmp(&a.residual.abs()).then(a.row.cmp(&b.row)));
    sorted.truncate(top_n);
    sorted
}

/// Sizes of the search space for one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceCounts {
    pub num_dimensions: usize,
    pub num_terms: usize,
    pub elementary: usize,
    pub one_d: u128,
    /// `None` if it does not fit in 128 bits.
    pub n_d: Option<u128>,
    pub combinations: Option<u128>,
}

pub fn space_counts(
    num_dimensions: usize,
    num_terms: usize,
    p_values: &[f64],
    q_values: &[f64],
    x_values: &[f64],
) -> SpaceCounts {
    SpaceCounts {
        num_dimensions,
        num_terms,
        elementary: count_elementary(p_values, q_values, x_values),
        one_d: count_1d_basis_functions(p_values, q_values, x_values),
        n_d: count_nd_basis_functions(num_dimensions, p_values, q_values, x_values),
        combinations: count_basis_function_combinations(num_dimensions, num_terms, p_values, q_values, x_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ols::LinearModel;
    use crate::models::{BasisCombination, BasisSpace};

    fn fitted() -> (Dataset, FitResult) {
        let dataset = Dataset::from_columns(
            vec!["n".into()],
            "t".into(),
            vec![vec![1.0, 2.0, 3.0]],
            vec![2.0, 4.5, 5.0],
        )
        .unwrap();
        let space = BasisSpace::new(1, &[1.0], &[], &[]).unwrap();
        let fit = FitResult {
            error: 0.0,
            model: Some(LinearModel {
                coefficients: vec![2.0],
                intercept: 0.0,
                predictions: vec![2.0, 4.0, 6.0],
            }),
            basis: Some(BasisCombination::from_indices(&space, vec![0]).unwrap()),
        };
        (dataset, fit)
    }

    #[test]
    fn compute_residuals_basic() {
        let (dataset, fit) = fitted();
        let r = compute_residuals(&dataset, &fit).unwrap();
        assert_eq!(r.len(), 3);
        assert_eq!(r[1].row, 2);
        assert_eq!(r[1].features, vec![2.0]);
        assert!((r[1].residual - 0.5).abs() < 1e-12);
        assert!((r[2].residual + 1.0).abs() < 1e-12);
    }

    #[test]
    fn residuals_need_a_model() {
        let (dataset, _) = fitted();
        let err = compute_residuals(&dataset, &FitResult::rejected()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn largest_residuals_by_magnitude() {
        let (dataset, fit) = fitted();
        let r = compute_residuals(&dataset, &fit).unwrap();
        let top = largest_residuals(&r, 2);
        assert_eq!(top.iter().map(|r| r.row).collect::<Vec<_>>(), vec![3, 2]);
        assert!(largest_residuals(&r, 0).is_empty());
    }

    #[test]
    fn counts_for_default_space() {
        let c = space_counts(2, 2, &[1.0, 2.0, 3.0], &[1.0], &[2.0]);
        assert_eq!(c.elementary, 6);
        assert_eq!(c.one_d, 21);
        assert_eq!(c.n_d, Some(441));
        assert_eq!(c.combinations, Some(441 * 440 / 2));
    }
}
