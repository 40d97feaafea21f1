//! Basis combinations: the right-hand side of one candidate linear model.
//!
//! The evaluator relies on two primitive operations implemented here:
//! - build the design matrix for a combination over a dataset (for OLS)
//! - predict targets from a fitted model (for reports and checks)

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::domain::Dataset;
use crate::error::AppError;
use crate::math::ols::LinearModel;
use crate::models::nd::{BasisSpace, NdBasisFunction};

/// A selection of distinct N-D basis functions, in generation order.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisCombination {
    /// Positions of the members in the [`BasisSpace`].
    pub indices: Vec<u128>,
    pub functions: Vec<NdBasisFunction>,
}

impl BasisCombination {
    /// Resolve `indices` against `space`.
    pub fn from_indices(space: &BasisSpace, indices: Vec<u128>) -> Result<Self, AppError> {
        let functions = indices
            .iter()
            .map(|&i| {
                space.get(i).ok_or_else(|| {
                    AppError::invalid_input(format!(
                        "Basis index {i} is outside a space of {} functions.",
                        space.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { indices, functions })
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.functions.iter().map(NdBasisFunction::name).collect()
    }
}

impl fmt::Display for BasisCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(" + "))
    }
}

/// Evaluate every function of `combination` over `dataset`, one column each.
pub fn design_matrix(combination: &BasisCombination, dataset: &Dataset) -> Result<DMatrix<f64>, AppError> {
    let mut x = DMatrix::<f64>::zeros(dataset.num_rows(), combination.len());
    for (j, f) in combination.functions.iter().enumerate() {
        let col = f.evaluate(dataset.columns())?;
        x.set_column(j, &DVector::from_vec(col));
    }
    Ok(x)
}

/// Predict targets for `dataset` using a fitted model over `combination`.
pub fn predict(
    model: &LinearModel,
    combination: &BasisCombination,
    dataset: &Dataset,
) -> Result<Vec<f64>, AppError> {
    if model.coefficients.len() != combination.len() {
        return Err(AppError::invalid_input(format!(
            "Model has {} coefficients but the combination has {} terms.",
            model.coefficients.len(),
            combination.len()
        )));
    }
    let x = design_matrix(combination, dataset)?;
    Ok(x.row_iter()
        .map(|row| {
            let row: Vec<f64> = row.iter().copied().collect();
            model.predict_row(&row)
        })
        .collect())
}
