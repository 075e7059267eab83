//! Validation helpers for forecast inputs and posterior draws.
//!
//! Purpose
//! -------
//! Centralize the shape, finiteness, positivity, and stochasticity checks used
//! by the request validator and the posterior-draw containers so every entry
//! point rejects malformed input with the same typed errors.
//!
//! Key behaviors
//! -------------
//! - [`validate_shape`] compares an array shape with the shape implied by the
//!   model dimensions and reports both on mismatch.
//! - [`validate_finite_matrix`] rejects NaN and ±∞ entries with their position.
//! - [`validate_positive_draws`] and [`validate_finite_draws`] scan posterior
//!   parameter arrays whose last axis indexes draws and report the first
//!   offending draw.
//! - [`validate_probability_vector`] / [`validate_row_stochastic`] check regime
//!   distributions and transition matrices up to [`STOCHASTIC_TOL`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Posterior arrays carry the draw index on their **last** axis.
//! - Probabilities must be finite, non-negative, and sum to one within
//!   [`STOCHASTIC_TOL`]; they are not renormalized here.
//!
//! Conventions
//! -----------
//! - Pure functions: no allocation beyond error construction, no I/O.
//! - The first violation found in memory order is reported.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and a success path per helper.
use crate::forecast::errors::{ForecastError, ForecastResult};
use ndarray::{ArrayView1, ArrayView2, ArrayViewD, Axis};

/// Absolute tolerance on `|Σ p − 1|` for probability vectors.
pub const STOCHASTIC_TOL: f64 = 1e-8;

/// Validate that `actual` equals the `expected` shape.
///
/// Errors
/// ------
/// - `ForecastError::ShapeMismatch` carrying both shapes.
pub fn validate_shape(
    what: &'static str, actual: &[usize], expected: &[usize],
) -> ForecastResult<()> {
    if actual != expected {
        return Err(ForecastError::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

/// Validate that every entry of a 2-D input is finite.
///
/// Errors
/// ------
/// - `ForecastError::InvalidValue` with the first offending `(row, col)`.
pub fn validate_finite_matrix(what: &'static str, values: ArrayView2<f64>) -> ForecastResult<()> {
    for ((row, col), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(ForecastError::InvalidValue { what, row, col, value });
        }
    }
    Ok(())
}

/// Validate that every entry of a posterior array is finite.
///
/// Parameters
/// ----------
/// - `what`: name used in error messages.
/// - `values`: array of any rank whose last axis indexes posterior draws.
///
/// Errors
/// ------
/// - `ForecastError::InvalidParameter` naming the draw of the first
///   non-finite entry.
pub fn validate_finite_draws(what: &'static str, values: ArrayViewD<f64>) -> ForecastResult<()> {
    scan_draws(what, values, |v| v.is_finite(), "must be finite")
}

/// Validate that every entry of a posterior array is finite and strictly positive.
///
/// Errors
/// ------
/// - `ForecastError::InvalidParameter` naming the draw of the first violation.
pub fn validate_positive_draws(what: &'static str, values: ArrayViewD<f64>) -> ForecastResult<()> {
    scan_draws(what, values, |v| v.is_finite() && v > 0.0, "must be finite and > 0")
}

/// Validate a single probability vector belonging to posterior draw `draw`.
///
/// Errors
/// ------
/// - `ForecastError::InvalidParameter` if an entry is negative / non-finite
///   or the entries do not sum to one within [`STOCHASTIC_TOL`].
pub fn validate_probability_vector(
    what: &'static str, probs: ArrayView1<f64>, draw: usize,
) -> ForecastResult<()> {
    if let Some(&value) = probs.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(ForecastError::InvalidParameter {
            what,
            draw,
            value,
            reason: "probabilities must be finite and non-negative",
        });
    }
    let total = probs.sum();
    if (total - 1.0).abs() > STOCHASTIC_TOL {
        return Err(ForecastError::InvalidParameter {
            what,
            draw,
            value: total,
            reason: "probabilities must sum to one",
        });
    }
    Ok(())
}

/// Validate that an `M × M` matrix of draw `draw` is row-stochastic.
///
/// Errors
/// ------
/// - `ForecastError::InvalidParameter` for the first row that is not a
///   probability vector.
pub fn validate_row_stochastic(
    what: &'static str, matrix: ArrayView2<f64>, draw: usize,
) -> ForecastResult<()> {
    matrix.rows().into_iter().try_for_each(|row| validate_probability_vector(what, row, draw))
}

// ---- Helper methods ----

fn scan_draws<F: Fn(f64) -> bool>(
    what: &'static str, values: ArrayViewD<f64>, ok: F, reason: &'static str,
) -> ForecastResult<()> {
    let last = values.ndim().saturating_sub(1);
    for (draw, slab) in values.axis_iter(Axis(last)).enumerate() {
        if let Some(&value) = slab.iter().find(|v| !ok(**v)) {
            return Err(ForecastError::InvalidParameter { what, draw, value, reason });
        }
    }
    Ok(())
}
