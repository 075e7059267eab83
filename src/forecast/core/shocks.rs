//! Structural shock sampling — unconstrained draws and exact conditioning on
//! hard future values.
//!
//! Purpose
//! -------
//! Draw the structural shock vector `u_h` of one forecast step and, when some
//! coordinates of `y_h` are pinned by a conditional forecast, replace it by a
//! draw from its exact conditional distribution given those constraints.
//!
//! Key behaviors
//! -------------
//! - [`draw_shocks`] samples `u_n = σ_n·z_n` with `z_n ~ N(0, 1)` in variable
//!   order.
//! - [`condition_shocks`] applies the Gaussian conditioning update
//!   `u* = u + D Cᵀ (C D Cᵀ)⁻¹ (r − C u)`, where `C` holds the constrained rows
//!   of `B⁻¹`, `D = diag(σ²)` and `r = c − μ_c`. If `u ~ N(0, D)` then
//!   `u* ~ N(0, D) | C u = r` exactly.
//!
//! Invariants & assumptions
//! ------------------------
//! - Variances are finite and strictly positive (enforced upstream by the
//!   volatility forecaster).
//! - The conditioning step consumes no randomness; it only transforms the
//!   unconstrained draw, so the generator stream does not depend on which
//!   coordinates are constrained.
//!
//! Conventions
//! -----------
//! - `C D Cᵀ` is solved by Cholesky; if that fails or its solution is
//!   inconsistent, a truncated pseudoinverse is used instead.
//! - Consistency is checked after solving: `‖C u* − r‖∞ ≤ tol·(1 + ‖r‖∞)`.
//!   A failed check means the constraints contradict each other under this
//!   draw's dynamics.
//!
//! Testing notes
//! -------------
//! - Unit tests check exact constraint satisfaction, Monte Carlo agreement of
//!   the free coordinate with the bivariate-normal conditional moments, the
//!   minimum-norm handling of duplicated consistent constraints, and the
//!   infeasibility error for contradictory ones.
use crate::forecast::{
    core::linalg::{solve_pseudo_inverse, solve_symmetric},
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Draw independent structural shocks with the given variances.
pub fn draw_shocks<R: Rng + ?Sized>(variances: ArrayView1<f64>, rng: &mut R) -> Array1<f64> {
    variances
        .iter()
        .map(|&var| {
            let z: f64 = StandardNormal.sample(rng);
            var.sqrt() * z
        })
        .collect()
}

/// ShockConstraint — one forecast step's conditioning system.
///
/// Fields
/// ------
/// - `b_inv`: `B_s⁻¹` (N × N), mapping structural to reduced-form shocks.
/// - `variances`: `σ²_h` (N), the diagonal of `D`.
/// - `mean`: `μ_h = A_s x_h` (N).
/// - `constraints`: pinned `(variable, value)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct ShockConstraint<'a> {
    pub b_inv: ArrayView2<'a, f64>,
    pub variances: ArrayView1<'a, f64>,
    pub mean: ArrayView1<'a, f64>,
    pub constraints: &'a [(usize, f64)],
}

/// condition_shocks — exact conditional draw of `u` given pinned coordinates.
///
/// Parameters
/// ----------
/// - `shocks`: `&Array1<f64>`
///   Unconstrained draw `u ~ N(0, D)`.
/// - `system`: `&ShockConstraint`
///   Constraint system of the current forecast step.
/// - `tol`: `f64`
///   Relative tolerance of the consistency check and pseudoinverse truncation.
/// - `draw`, `horizon`: `usize`
///   Reported on failure.
///
/// Returns
/// -------
/// `ForecastResult<Array1<f64>>`
///   `u*` such that `(μ + B⁻¹ u*)_c = c` up to floating-point error. Returns
///   `shocks` unchanged when no coordinate is constrained.
///
/// Errors
/// ------
/// - `ForecastError::InfeasibleConstraint` if neither the Cholesky nor the
///   pseudoinverse solution satisfies the consistency check.
pub fn condition_shocks(
    shocks: &Array1<f64>, system: &ShockConstraint<'_>, tol: f64, draw: usize, horizon: usize,
) -> ForecastResult<Array1<f64>> {
    let m = system.constraints.len();
    if m == 0 {
        return Ok(shocks.clone());
    }
    let n = shocks.len();

    // C: constrained rows of B⁻¹, CD = C·diag(σ²).
    let mut c = Array2::<f64>::zeros((m, n));
    let mut target = Array1::<f64>::zeros(m);
    for (row, &(var, value)) in system.constraints.iter().enumerate() {
        c.row_mut(row).assign(&system.b_inv.row(var));
        target[row] = value - system.mean[var];
    }
    let cd = &c * &system.variances;
    let gram = cd.dot(&c.t());
    let gap = &target - &c.dot(shocks);

    let r_norm = target.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let bound = tol * (1.0 + r_norm);
    let update = |lambda: Array1<f64>| -> (Array1<f64>, f64) {
        let conditioned = shocks + &cd.t().dot(&lambda);
        let residual = (&c.dot(&conditioned) - &target)
            .iter()
            .fold(0.0_f64, |acc, v| if v.is_finite() { acc.max(v.abs()) } else { f64::INFINITY });
        (conditioned, residual)
    };

    let mut worst = f64::INFINITY;
    if let Some(lambda) = solve_symmetric(gram.view(), gap.view()) {
        let (conditioned, residual) = update(lambda);
        if residual <= bound {
            return Ok(conditioned);
        }
        worst = residual;
    }
    if let Some(lambda) = solve_pseudo_inverse(gram.view(), gap.view(), tol) {
        let (conditioned, residual) = update(lambda);
        if residual <= bound {
            return Ok(conditioned);
        }
        worst = worst.min(residual);
    }
    Err(ForecastError::InfeasibleConstraint { draw, horizon, residual: worst })
}
