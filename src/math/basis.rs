//! One-dimensional basis functions for complexity models.
//!
//! The vocabulary is fixed:
//!
//! - `n^p` (polynomial)
//! - `log(n)^q` (polylogarithmic)
//! - `X^n` (exponential)
//! - `Gamma(n+1)` (factorial, generalized to real inputs)
//!
//! plus the product of any two distinct elementary functions ("mixed").
//!
//! Numerical notes:
//! - `log(n)` is evaluated as `ln(n + 1e-9)` so that `n = 0` stays finite.
//! - Products are all-or-nothing: if any factor (or the running product) is
//!   NaN or infinite anywhere in the vector, the whole output is NaN.

use std::fmt;

/// Offset added inside `ln` to avoid `log(0)`.
pub const LOG_EPS: f64 = 1e-9;

/// Placeholder variable used in names outside an N-D context.
pub const PLACEHOLDER_VAR: &str = "n";

/// A basis function from a single primitive family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementaryBasisFunction {
    Polynomial { p: f64 },
    Polylog { q: f64 },
    Exponential { base: f64 },
    Factorial,
}

impl ElementaryBasisFunction {
    /// Evaluate at a single point.
    pub fn value(self, n: f64) -> f64 {
        match self {
            Self::Polynomial { p } => n.powf(p),
            Self::Polylog { q } => (n + LOG_EPS).ln().powf(q),
            Self::Exponential { base } => base.powf(n),
            Self::Factorial => libm::tgamma(n + 1.0),
        }
    }

    /// Evaluate elementwise. No NaN masking happens at this level.
    pub fn evaluate(self, n: &[f64]) -> Vec<f64> {
        n.iter().map(|&v| self.value(v)).collect()
    }

    /// Render the name using `var` as the input variable.
    pub fn name(self, var: &str) -> String {
        match self {
            Self::Polynomial { p } => format!("{var}^{p}"),
            Self::Polylog { q } => format!("log({var})^{q}"),
            Self::Exponential { base } => format!("{base}^{var}"),
            Self::Factorial => format!("Gamma({var}+1)"),
        }
    }
}

impl fmt::Display for ElementaryBasisFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(PLACEHOLDER_VAR))
    }
}

/// A 1-D basis function: elementary, or the product of two distinct elementary functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasisFunction {
    Elementary(ElementaryBasisFunction),
    Mixed(ElementaryBasisFunction, ElementaryBasisFunction),
}

impl BasisFunction {
    pub fn evaluate(&self, n: &[f64]) -> Vec<f64> {
        match *self {
            Self::Elementary(f) => f.evaluate(n),
            Self::Mixed(a, b) => guarded_product(n.len(), [a, b].into_iter().map(|f| f.evaluate(n))),
        }
    }

    pub fn name(&self, var: &str) -> String {
        match *self {
            Self::Elementary(f) => f.name(var),
            Self::Mixed(a, b) => format!("{} * {}", a.name(var), b.name(var)),
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Mixed(..))
    }
}

impl fmt::Display for BasisFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(PLACEHOLDER_VAR))
    }
}

impl From<ElementaryBasisFunction> for BasisFunction {
    fn from(value: ElementaryBasisFunction) -> Self {
        Self::Elementary(value)
    }
}

/// Elementwise product of `terms` with all-or-nothing NaN propagation.
///
/// Terms are consumed lazily; evaluation stops at the first non-finite term or
/// non-finite running product and the result is `len` NaNs.
pub fn guarded_product<I>(len: usize, terms: I) -> Vec<f64>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut acc = vec![1.0; len];
    for term in terms {
        if !all_finite(&term) {
            return vec![f64::NAN; len];
        }
        for (a, t) in acc.iter_mut().zip(&term) {
            *a *= t;
        }
        if !all_finite(&acc) {
            return vec![f64::NAN; len];
        }
    }
    acc
}

pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// The elementary set: polynomials, polylogs, exponentials, then one factorial.
pub fn generate_elementary(
    p_values: &[f64],
    q_values: &[f64],
    x_values: &[f64],
) -> Vec<ElementaryBasisFunction> {
    let mut out = Vec::with_capacity(p_values.len() + q_values.len() + x_values.len() + 1);
    out.extend(p_values.iter().map(|&p| ElementaryBasisFunction::Polynomial { p }));
    out.extend(q_values.iter().map(|&q| ElementaryBasisFunction::Polylog { q }));
    out.extend(x_values.iter().map(|&base| ElementaryBasisFunction::Exponential { base }));
    out.push(ElementaryBasisFunction::Factorial);
    out
}

/// The full 1-D sequence: the elementary set followed by every pair of
/// distinct positions `(i, j)`, `i < j`, in lexicographic order.
pub fn generate_1d(p_values: &[f64], q_values: &[f64], x_values: &[f64]) -> Vec<BasisFunction> {
    let elementary = generate_elementary(p_values, q_values, x_values);
    let e = elementary.len();
    let mut out = Vec::with_capacity(e + e * e.saturating_sub(1) / 2);
    out.extend(elementary.iter().copied().map(BasisFunction::Elementary));
    for i in 0..e {
        for j in (i + 1)..e {
            out.push(BasisFunction::Mixed(elementary[i], elementary[j]));
        }
    }
    out
}
