//! Exact counts of the search space.
//!
//! All counts are computed in closed form; nothing here enumerates the space.
//! Results are exact `u128` integers. `None` means the exact value does not fit.

/// Binomial coefficient `C(n, k)`.
///
/// Returns `Some(0)` when `k < 0` or `k > n`. Uses the symmetry `k -> n - k` and
/// the incremental product `C(n, i+1) = C(n, i) * (n - i) / (i + 1)`, dividing
/// out the common factor first so the intermediate never exceeds the result by
/// more than a factor of `n - i`.
pub fn n_choose_k(n: i64, k: i64) -> Option<u128> {
    if k < 0 || k > n {
        return Some(0);
    }
    choose(n as u128, k as u128)
}

/// [`n_choose_k`] over unsigned arguments.
pub fn choose(n: u128, k: u128) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);

    let mut result: u128 = 1;
    for i in 0..k {
        // `result * (n - i)` is divisible by `i + 1`; split the division
        // across both factors so it stays exact.
        let g = gcd(result, i + 1);
        let den_rest = (i + 1) / g;
        result = (result / g).checked_mul((n - i) / den_rest)?;
    }
    Some(result)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Size of the elementary set: `|p| + |q| + |X| + 1`.
pub fn count_elementary(p_values: &[f64], q_values: &[f64], x_values: &[f64]) -> usize {
    p_values.len() + q_values.len() + x_values.len() + 1
}

/// Number of 1-D basis functions: `E + C(E, 2)`.
pub fn count_1d_basis_functions(p_values: &[f64], q_values: &[f64], x_values: &[f64]) -> u128 {
    let e = count_elementary(p_values, q_values, x_values) as u128;
    e + e * (e - 1) / 2
}

/// Number of N-D basis functions: `count_1d ^ num_dimensions`.
pub fn count_nd_basis_functions(
    num_dimensions: usize,
    p_values: &[f64],
    q_values: &[f64],
    x_values: &[f64],
) -> Option<u128> {
    let base = count_1d_basis_functions(p_values, q_values, x_values);
    let exp = u32::try_from(num_dimensions).ok()?;
    base.checked_pow(exp)
}

/// Number of grid-search candidates: `C(count_nd, num_terms)`.
pub fn count_basis_function_combinations(
    num_dimensions: usize,
    num_terms: usize,
    p_values: &[f64],
    q_values: &[f64],
    x_values: &[f64],
) -> Option<u128> {
    let nd = count_nd_basis_functions(num_dimensions, p_values, q_values, x_values)?;
    choose(nd, num_terms as u128)
}
