//! Dense linear algebra for the predictive simulator.
//!
//! Purpose
//! -------
//! Bridge between the `ndarray` containers used on the public surface and
//! `nalgebra` factorizations (SVD, LU inverse, Cholesky, pseudoinverse) used
//! per posterior draw.
//!
//! Key behaviors
//! -------------
//! - [`to_dmatrix`] / [`from_dmatrix`] copy matrices column by column between
//!   the two libraries.
//! - [`invert_structural`] inverts a structural matrix `B_s` after a
//!   conditioning check on its singular values.
//! - [`solve_symmetric`] solves a symmetric positive (semi-)definite system by
//!   Cholesky with a truncated pseudoinverse fallback.
//!
//! Conventions
//! -----------
//! - Conditioning of `B` is measured by `σ_min / σ_max`; a ratio at or below
//!   the caller's tolerance is treated as numerically singular.
//! - Copies are explicit; no view sharing between libraries.
use crate::forecast::errors::{ForecastError, ForecastResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Copy an `ndarray` matrix into a freshly allocated `DMatrix`.
pub fn to_dmatrix(src: ArrayView2<f64>) -> DMatrix<f64> {
    let (rows, cols) = src.dim();
    let mut out = DMatrix::<f64>::zeros(rows, cols);
    for j in 0..cols {
        for i in 0..rows {
            out[(i, j)] = src[[i, j]];
        }
    }
    out
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(src: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((src.nrows(), src.ncols()), |(i, j)| src[(i, j)])
}

/// invert_structural — checked inverse of a structural matrix draw.
///
/// Parameters
/// ----------
/// - `b`: `ArrayView2<f64>`
///   Square `N × N` structural matrix `B_s`.
/// - `draw`: `usize`
///   Posterior draw index, reported on failure.
/// - `singular_tol`: `f64`
///   Threshold on the reciprocal condition number `σ_min / σ_max`.
///
/// Returns
/// -------
/// `ForecastResult<Array2<f64>>`
///   `B_s⁻¹` with finite entries.
///
/// Errors
/// ------
/// - `ForecastError::SingularStructuralMatrix { draw }` if the reciprocal
///   condition number is at or below `singular_tol`, the LU inverse fails,
///   or the inverse holds non-finite entries.
pub fn invert_structural(
    b: ArrayView2<f64>, draw: usize, singular_tol: f64,
) -> ForecastResult<Array2<f64>> {
    let b_nalg = to_dmatrix(b);
    let singular_values = b_nalg.clone().svd(false, false).singular_values;
    let (lo, hi) = singular_values
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &sv| (lo.min(sv), hi.max(sv)));
    if !(hi > 0.0 && hi.is_finite() && lo / hi > singular_tol) {
        return Err(ForecastError::SingularStructuralMatrix { draw });
    }
    let inverse = b_nalg.try_inverse().ok_or(ForecastError::SingularStructuralMatrix { draw })?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::SingularStructuralMatrix { draw });
    }
    Ok(from_dmatrix(&inverse))
}

/// Solve `G λ = rhs` for symmetric positive definite `G` by Cholesky.
///
/// Returns `None` when `G` is not numerically positive definite; callers fall
/// back to [`solve_pseudo_inverse`].
pub fn solve_symmetric(g: ArrayView2<f64>, rhs: ArrayView1<f64>) -> Option<Array1<f64>> {
    let chol = to_dmatrix(g).cholesky()?;
    let solution = chol.solve(&DVector::from_iterator(rhs.len(), rhs.iter().copied()));
    Some(Array1::from_iter(solution.iter().copied()))
}

/// Minimum-norm solution of `G λ = rhs` via the pseudoinverse, truncating
/// singular values at or below `eps · max(1, max|G_ij|)`.
pub fn solve_pseudo_inverse(
    g: ArrayView2<f64>, rhs: ArrayView1<f64>, eps: f64,
) -> Option<Array1<f64>> {
    let g_nalg = to_dmatrix(g);
    let scale = g_nalg.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
    let pinv = g_nalg.pseudo_inverse(eps * scale).ok()?;
    let solution = pinv * DVector::from_iterator(rhs.len(), rhs.iter().copied());
    Some(Array1::from_iter(solution.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Lossless copies between ndarray and nalgebra (non-square included).
    // - Inversion of well-conditioned B and rejection of singular or
    //   near-singular B.
    // - The Cholesky solver and the pseudoinverse fallback.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the copy bridge preserves every entry and orientation.
    //
    // Given
    // -----
    // - A 2 × 3 matrix.
    //
    // Expect
    // ------
    // - Round trip returns the same matrix; `DMatrix` indexing matches.
    fn copy_bridge_preserves_entries() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let d = to_dmatrix(m.view());
        assert_eq!(d[(1, 2)], 6.0);
        assert_eq!(from_dmatrix(&d), m);
    }

    #[test]
    // Purpose
    // -------
    // Check that a well-conditioned B is inverted exactly.
    //
    // Given
    // -----
    // - B = [[2, 0], [1, 1]].
    //
    // Expect
    // ------
    // - B⁻¹ = [[0.5, 0], [-0.5, 1]].
    fn invert_structural_inverts_regular_matrix() {
        let b = array![[2.0, 0.0], [1.0, 1.0]];
        let inv = invert_structural(b.view(), 0, 1e-12).unwrap();
        let expected = array![[0.5, 0.0], [-0.5, 1.0]];
        for (got, want) in inv.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure singular and ill-conditioned draws are reported with their index.
    //
    // Given
    // -----
    // - An exactly singular B and one with σ_min / σ_max ≈ 1e-14.
    //
    // Expect
    // ------
    // - `SingularStructuralMatrix { draw }` for both.
    fn invert_structural_rejects_singular_matrices() {
        let singular = array![[1.0, 2.0], [2.0, 4.0]];
        assert_eq!(
            invert_structural(singular.view(), 5, 1e-12).unwrap_err(),
            ForecastError::SingularStructuralMatrix { draw: 5 }
        );
        let nearly = array![[1.0, 0.0], [0.0, 1e-14]];
        assert_eq!(
            invert_structural(nearly.view(), 1, 1e-12).unwrap_err(),
            ForecastError::SingularStructuralMatrix { draw: 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Exercise both solve routes.
    //
    // Given
    // -----
    // - A positive definite G and a rank-one G with consistent right-hand side.
    //
    // Expect
    // ------
    // - Exact Cholesky solution for the PD system.
    // - Cholesky declines the rank-one system (`None`); the pseudoinverse
    //   gives the minimum-norm λ = (0.5, 0.5) for G = [[1, 1], [1, 1]],
    //   rhs = (1, 1).
    fn solve_symmetric_handles_definite_and_semidefinite_systems() {
        let g = array![[4.0, 1.0], [1.0, 3.0]];
        let lambda = solve_symmetric(g.view(), array![1.0, 2.0].view()).unwrap();
        let fitted = g.dot(&lambda);
        assert_abs_diff_eq!(fitted[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fitted[1], 2.0, epsilon = 1e-12);

        let rank_one = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(solve_symmetric(rank_one.view(), array![1.0, 1.0].view()).is_none());
        let lambda = solve_pseudo_inverse(rank_one.view(), array![1.0, 1.0].view(), 1e-10).unwrap();
        assert_abs_diff_eq!(lambda[0], 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(lambda[1], 0.5, epsilon = 1e-10);
    }
}
