//! Posterior draws of the structural parameters.
//!
//! [`PosteriorDraws`] bundles the autoregressive draws `A` (N × K × S), the
//! structural matrices `B` (N × N × S), and the heteroskedasticity variant with
//! its own parameter draws. Construction checks that every array agrees on N
//! and S and holds finite values, so the simulator can slice draw `s` without
//! further checks. Draws are never reordered: slice `s` of every array belongs
//! to the same posterior draw.
use crate::forecast::{
    core::{
        shape::SVARShape,
        validation::{validate_finite_draws, validate_shape},
        volatility::Heteroskedasticity,
    },
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array3, ArrayView2, Axis};

/// PosteriorDraws — immutable, validated posterior sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorDraws {
    a: Array3<f64>,
    b: Array3<f64>,
    heteroskedasticity: Heteroskedasticity,
}

impl PosteriorDraws {
    /// Validate and wrap posterior draws.
    ///
    /// Parameters
    /// ----------
    /// - `a`: `Array3<f64>`
    ///   Autoregressive draws, shape `(N, K, S)`.
    /// - `b`: `Array3<f64>`
    ///   Structural matrices, shape `(N, N, S)`.
    /// - `heteroskedasticity`: [`Heteroskedasticity`]
    ///   Variance process and its draws.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::ShapeMismatch` if `B` is not `(N, N, S)`, if `S = 0`
    ///   or `N = 0`, or if the variant's per-variable arrays do not have N rows.
    /// - `ForecastError::DrawCountMismatch` if the variant carries a different
    ///   number of draws than `A`.
    /// - `ForecastError::InvalidParameter` on non-finite `A` or `B` entries.
    pub fn new(
        a: Array3<f64>, b: Array3<f64>, heteroskedasticity: Heteroskedasticity,
    ) -> ForecastResult<Self> {
        let (n, _, s) = a.dim();
        if n == 0 || s == 0 {
            return Err(ForecastError::ShapeMismatch {
                what: "autoregressive draws",
                expected: vec![n.max(1), a.dim().1, s.max(1)],
                actual: a.shape().to_vec(),
            });
        }
        validate_shape("structural matrix draws", b.shape(), &[n, n, s])?;
        if let Some(actual) = heteroskedasticity.n_draws().filter(|&actual| actual != s) {
            return Err(ForecastError::DrawCountMismatch {
                what: "heteroskedasticity parameters",
                expected: s,
                actual,
            });
        }
        if let Some(rows) = heteroskedasticity.n_variables().filter(|&rows| rows != n) {
            return Err(ForecastError::ShapeMismatch {
                what: "heteroskedasticity parameters",
                expected: vec![n],
                actual: vec![rows],
            });
        }
        validate_finite_draws("autoregressive draws", a.view().into_dyn())?;
        validate_finite_draws("structural matrix draws", b.view().into_dyn())?;
        Ok(PosteriorDraws { a, b, heteroskedasticity })
    }

    /// Number of variables N.
    pub fn n(&self) -> usize {
        self.a.dim().0
    }

    /// Regressor length K.
    pub fn k(&self) -> usize {
        self.a.dim().1
    }

    /// Number of posterior draws S.
    pub fn n_draws(&self) -> usize {
        self.a.dim().2
    }

    /// `A_s` (N × K).
    pub fn a(&self, s: usize) -> ArrayView2<'_, f64> {
        self.a.index_axis(Axis(2), s)
    }

    /// `B_s` (N × N).
    pub fn b(&self, s: usize) -> ArrayView2<'_, f64> {
        self.b.index_axis(Axis(2), s)
    }

    pub fn heteroskedasticity(&self) -> &Heteroskedasticity {
        &self.heteroskedasticity
    }

    /// Check that the draws match the model dimensions of a state.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::ShapeMismatch` if N or K differ.
    pub fn check_shape(&self, shape: &SVARShape) -> ForecastResult<()> {
        validate_shape("autoregressive draws", &[self.n(), self.k()], &[shape.n, shape.k()])
    }
}
