//! N-dimensional basis functions and the indexable N-D basis space.
//!
//! An N-D basis function holds one 1-D basis function per input dimension and
//! evaluates to their elementwise product. The space of all N-D functions is
//! the Cartesian product of the 1-D sequence with itself `num_dimensions`
//! times. It is never materialized: [`BasisSpace`] decodes a mixed-radix index
//! into the function at that position, with the last dimension varying
//! fastest (the first factor always applies to dimension 1).

use std::fmt;

use crate::error::AppError;
use crate::math::basis::{BasisFunction, generate_1d, guarded_product};
use crate::math::combinatorics::count_1d_basis_functions;

/// A product of one 1-D basis function per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct NdBasisFunction {
    factors: Vec<BasisFunction>,
}

impl NdBasisFunction {
    pub fn new(factors: Vec<BasisFunction>) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &[BasisFunction] {
        &self.factors
    }

    pub fn num_dimensions(&self) -> usize {
        self.factors.len()
    }

    /// Evaluate over one column per dimension.
    ///
    /// Returns all-NaN if any factor, or the running product, is non-finite
    /// anywhere. Errors if the column count or column lengths disagree.
    pub fn evaluate<C: AsRef<[f64]>>(&self, columns: &[C]) -> Result<Vec<f64>, AppError> {
        if columns.len() != self.factors.len() {
            return Err(AppError::invalid_input(format!(
                "Basis function '{self}' needs {} input columns, got {}.",
                self.factors.len(),
                columns.len()
            )));
        }
        let len = columns.first().map(|c| c.as_ref().len()).unwrap_or(0);
        if columns.iter().any(|c| c.as_ref().len() != len) {
            return Err(AppError::invalid_input(
                "Input columns have different lengths.",
            ));
        }

        Ok(guarded_product(
            len,
            self.factors
                .iter()
                .zip(columns)
                .map(|(f, col)| f.evaluate(col.as_ref())),
        ))
    }

    /// Canonical name, e.g. `n_1^2 * log(n_2)^1`.
    pub fn name(&self) -> String {
        self.factors
            .iter()
            .enumerate()
            .map(|(i, f)| f.name(&format!("n_{}", i + 1)))
            .collect::<Vec<_>>()
            .join(" * ")
    }
}

impl fmt::Display for NdBasisFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The full N-D basis space, addressable by index.
#[derive(Debug, Clone)]
pub struct BasisSpace {
    one_d: Vec<BasisFunction>,
    num_dimensions: usize,
    len: u128,
}

impl BasisSpace {
    /// Build the space over `num_dimensions` dimensions from the given exponents and bases.
    pub fn new(
        num_dimensions: usize,
        p_values: &[f64],
        q_values: &[f64],
        x_values: &[f64],
    ) -> Result<Self, AppError> {
        let one_d = generate_1d(p_values, q_values, x_values);
        debug_assert_eq!(
            one_d.len() as u128,
            count_1d_basis_functions(p_values, q_values, x_values)
        );
        Self::from_one_d(one_d, num_dimensions)
    }

    /// Build the space from an explicit 1-D sequence.
    pub fn from_one_d(one_d: Vec<BasisFunction>, num_dimensions: usize) -> Result<Self, AppError> {
        if num_dimensions == 0 {
            return Err(AppError::invalid_input("Number of dimensions must be >= 1."));
        }
        let exp = u32::try_from(num_dimensions)
            .map_err(|_| AppError::invalid_input("Too many dimensions."))?;
        let len = (one_d.len() as u128).checked_pow(exp).ok_or_else(|| {
            AppError::invalid_input(format!(
                "Basis space of {}^{num_dimensions} functions does not fit in 128 bits.",
                one_d.len()
            ))
        })?;
        Ok(Self {
            one_d,
            num_dimensions,
            len,
        })
    }

    pub fn len(&self) -> u128 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    pub fn one_d(&self) -> &[BasisFunction] {
        &self.one_d
    }

    /// The function at `index` in generation order, or `None` if out of range.
    pub fn get(&self, index: u128) -> Option<NdBasisFunction> {
        if index >= self.len {
            return None;
        }
        let radix = self.one_d.len() as u128;
        let mut rest = index;
        let mut factors = vec![self.one_d[0]; self.num_dimensions];
        for slot in factors.iter_mut().rev() {
            *slot = self.one_d[(rest % radix) as usize];
            rest /= radix;
        }
        Some(NdBasisFunction::new(factors))
    }

    /// Lazily iterate every function in generation order.
    pub fn iter(&self) -> impl Iterator<Item = NdBasisFunction> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }
}
