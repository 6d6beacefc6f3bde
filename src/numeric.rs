//! Floating point comparison helpers, thin wrappers around the approx crate.

use approx::{AbsDiffEq, RelativeEq};

/// Relative tolerance used when checking that a step conserved the population.
pub const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Compares two floats relative to the larger magnitude of the pair.
#[must_use]
pub fn relatively_eq(a: f64, b: f64, max_relative: f64) -> bool {
    a.relative_eq(&b, f64::EPSILON, max_relative)
}

/// Returns true when `values` sum to `total` within `CONSERVATION_TOLERANCE`.
#[must_use]
pub fn conserves(values: &[f64], total: f64) -> bool {
    relatively_eq(values.iter().sum(), total, CONSERVATION_TOLERANCE)
}
