//! Evaluation of a single candidate combination.
//!
//! Given:
//! - a basis combination (one column per N-D basis function)
//! - the dataset (feature columns and targets)
//! - a linear fit capability
//!
//! we build the design matrix, fit, and score the fit by mean squared error.
//! A design matrix with NaN or ±inf (a basis function overflowed on this data
//! range) is not an error: the candidate comes back as the infinite-error
//! sentinel. Any other fit failure is fatal.

use log::debug;
use nalgebra::DVector;

use crate::domain::{Dataset, FitResult};
use crate::error::AppError;
use crate::math::ols::{FitError, LinearFit, mean_squared_error};
use crate::models::{BasisCombination, BasisSpace, design_matrix};

/// Evaluate one combination against `dataset`.
pub fn evaluate_combination<F: LinearFit + ?Sized>(
    combination: BasisCombination,
    dataset: &Dataset,
    fitter: &F,
) -> Result<FitResult, AppError> {
    let targets = DVector::from_column_slice(dataset.targets());
    fit_with_targets(combination, dataset, &targets, fitter)
}

fn fit_with_targets<F: LinearFit + ?Sized>(
    combination: BasisCombination,
    dataset: &Dataset,
    targets: &DVector<f64>,
    fitter: &F,
) -> Result<FitResult, AppError> {
    let x = design_matrix(&combination, dataset)?;

    match fitter.fit(&x, targets) {
        Ok(model) => {
            let error = mean_squared_error(dataset.targets(), &model.predictions);
            Ok(FitResult {
                error,
                model: Some(model),
                basis: Some(combination),
            })
        }
        Err(FitError::NonFiniteInput) => {
            debug!("rejected '{combination}': non-finite design matrix");
            Ok(FitResult::rejected())
        }
        Err(e) => Err(AppError::fit_failure(format!(
            "Fitting '{combination}' failed: {e}"
        ))),
    }
}

/// Shared, read-only state for evaluating many candidates of one search.
pub struct Evaluator<'a, F: LinearFit + ?Sized> {
    space: &'a BasisSpace,
    dataset: &'a Dataset,
    targets: DVector<f64>,
    fitter: &'a F,
}

impl<'a, F: LinearFit + ?Sized> Evaluator<'a, F> {
    pub fn new(space: &'a BasisSpace, dataset: &'a Dataset, fitter: &'a F) -> Result<Self, AppError> {
        if space.num_dimensions() != dataset.num_dimensions() {
            return Err(AppError::invalid_input(format!(
                "Basis space has {} dimensions but the data has {}.",
                space.num_dimensions(),
                dataset.num_dimensions()
            )));
        }
        Ok(Self {
            space,
            dataset,
            targets: DVector::from_column_slice(dataset.targets()),
            fitter,
        })
    }

    /// Evaluate the combination made of the basis functions at `indices`.
    pub fn evaluate_indices(&self, indices: Vec<u128>) -> Result<FitResult, AppError> {
        let combination = BasisCombination::from_indices(self.space, indices)?;
        fit_with_targets(combination, self.dataset, &self.targets, self.fitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::basis::{BasisFunction, ElementaryBasisFunction};
    use crate::math::ols::{LinearModel, OrdinaryLeastSquares};
    use nalgebra::DMatrix;

    fn dataset() -> Dataset {
        let n: Vec<f64> = (1..=20).map(|i| i as f64 * 100.0).collect();
        let y: Vec<f64> = n.iter().map(|v| 3.0 * v + 5.0).collect();
        Dataset::from_columns(vec!["n".into()], "t".into(), vec![n], y).unwrap()
    }

    #[test]
    fn linear_data_fits_exactly() {
        let data = dataset();
        let space = BasisSpace::new(1, &[1.0], &[], &[10.0]).unwrap();
        let combo = BasisCombination::from_indices(&space, vec![0]).unwrap();
        let result = evaluate_combination(combo, &data, &OrdinaryLeastSquares).unwrap();

        assert!(result.error < 1e-12, "mse={}", result.error);
        let model = result.model.unwrap();
        assert!((model.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((model.intercept - 5.0).abs() < 1e-6);
        assert_eq!(result.basis.unwrap().to_string(), "n_1^1");
    }

    #[test]
    fn overflowing_basis_returns_infinite_sentinel() {
        let data = dataset();
        // 10^n overflows for n >= 309.
        let space = BasisSpace::new(1, &[1.0], &[], &[10.0]).unwrap();
        let exp_index = space
            .iter()
            .position(|f| {
                f.factors()[0] == BasisFunction::Elementary(ElementaryBasisFunction::Exponential { base: 10.0 })
            })
            .unwrap() as u128;
        let combo = BasisCombination::from_indices(&space, vec![exp_index]).unwrap();

        let result = evaluate_combination(combo, &data, &OrdinaryLeastSquares).unwrap();
        assert_eq!(result, FitResult::rejected());
    }

    struct BrokenSolver;

    impl LinearFit for BrokenSolver {
        fn fit(&self, _: &DMatrix<f64>, _: &DVector<f64>) -> Result<LinearModel, FitError> {
            Err(FitError::Solver("no convergence".to_string()))
        }
    }

    #[test]
    fn other_fit_failures_are_fatal() {
        let data = dataset();
        let space = BasisSpace::new(1, &[1.0], &[], &[]).unwrap();
        let combo = BasisCombination::from_indices(&space, vec![0]).unwrap();
        let err = evaluate_combination(combo, &data, &BrokenSolver).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("no convergence"));
    }

    #[test]
    fn evaluator_checks_dimensions() {
        let data = dataset();
        let space = BasisSpace::new(2, &[1.0], &[], &[]).unwrap();
        assert!(Evaluator::new(&space, &data, &OrdinaryLeastSquares).is_err());

        let space = BasisSpace::new(1, &[1.0], &[], &[]).unwrap();
        let eval = Evaluator::new(&space, &data, &OrdinaryLeastSquares).unwrap();
        assert!(eval.evaluate_indices(vec![0]).unwrap().is_usable());
        assert!(eval.evaluate_indices(vec![99]).is_err());
    }
}
