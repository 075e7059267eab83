//! Posterior draws of the variance-process parameters, one container per
//! heteroskedasticity variant.
//!
//! Purpose
//! -------
//! Hold the variant-specific posterior arrays delivered by the estimation
//! sampler in validated, read-only form so that the volatility forecaster can
//! index them by draw without further checks.
//!
//! Key behaviors
//! -------------
//! - [`RegimeDraws`] serves both Markov-switching heteroskedasticity and
//!   finite / sparse mixtures: per-regime variances, a row-stochastic
//!   transition matrix, and the terminal regime distribution per draw.
//!   [`RegimeDraws::from_mixture`] builds the degenerate transition matrix of
//!   an i.i.d. mixture from component probabilities.
//! - [`SVDraws`] carries the AR coefficient, innovation scale, terminal
//!   log-volatility, and the [`SVParameterization`] used during estimation.
//! - [`StudentTDraws`] carries one degrees-of-freedom draw per posterior draw.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every array has the draw index on its last axis and all arrays of one
//!   container agree on the number of draws S.
//! - Regime variances, centred SV innovation variances, and degrees of
//!   freedom are finite and strictly positive; the non-centred SV loading ω
//!   only has to be finite (its sign is not identified, and ω = 0 means a
//!   constant unit variance). Probabilities are validated by
//!   [`validate_probability_vector`].
//! - Sparse mixtures may carry components with zero probability; their
//!   variances must still be positive.
//!
//! Conventions
//! -----------
//! - Shapes: regime variances `(N, M, S)`, transitions `(M, M, S)` with
//!   `P[i, j] = Pr(regime j at t+1 | regime i at t)`, terminal distributions
//!   `(M, S)`, SV arrays `(N, S)`, degrees of freedom `(S)`.
use crate::forecast::{
    core::validation::{
        validate_finite_draws, validate_positive_draws, validate_probability_vector,
        validate_row_stochastic, validate_shape,
    },
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};

/// Regime-switching variance draws (Markov-switching or mixture).
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeDraws {
    variances: Array3<f64>,
    transition: Array3<f64>,
    terminal: Array2<f64>,
}

impl RegimeDraws {
    /// Build Markov-switching draws.
    ///
    /// # Arguments
    /// - `variances`: `(N, M, S)` regime-specific structural variances.
    /// - `transition`: `(M, M, S)` row-stochastic transition matrices.
    /// - `terminal`: `(M, S)` regime distribution at the last in-sample period.
    ///
    /// # Errors
    /// - [`ForecastError::ShapeMismatch`] / [`ForecastError::DrawCountMismatch`]
    ///   if `M` or `S` disagree across arrays.
    /// - [`ForecastError::InvalidParameter`] for non-positive variances or
    ///   invalid probabilities.
    pub fn new(
        variances: Array3<f64>, transition: Array3<f64>, terminal: Array2<f64>,
    ) -> ForecastResult<Self> {
        let (_, m, s) = variances.dim();
        validate_shape("regime transition matrices", &transition.shape()[..2], &[m, m])?;
        validate_shape("terminal regime distribution", &terminal.shape()[..1], &[m])?;
        check_draw_count("regime transition matrices", transition.len_of(Axis(2)), s)?;
        check_draw_count("terminal regime distribution", terminal.ncols(), s)?;
        validate_positive_draws("regime variances", variances.view().into_dyn())?;
        for (draw, p) in transition.axis_iter(Axis(2)).enumerate() {
            validate_row_stochastic("regime transition matrix", p, draw)?;
        }
        for (draw, pi) in terminal.axis_iter(Axis(1)).enumerate() {
            validate_probability_vector("terminal regime distribution", pi, draw)?;
        }
        Ok(RegimeDraws { variances, transition, terminal })
    }

    /// Build finite / sparse mixture draws from component probabilities.
    ///
    /// Every row of the implied transition matrix equals the draw's
    /// probability vector, and the terminal distribution is the probability
    /// vector itself, so forecasts do not depend on the last allocation.
    ///
    /// # Arguments
    /// - `variances`: `(N, M, S)` component variances.
    /// - `probabilities`: `(M, S)` mixture weights.
    pub fn from_mixture(
        variances: Array3<f64>, probabilities: Array2<f64>,
    ) -> ForecastResult<Self> {
        let (m, s) = probabilities.dim();
        let mut transition = Array3::<f64>::zeros((m, m, s));
        for (mut p, weights) in
            transition.axis_iter_mut(Axis(2)).zip(probabilities.axis_iter(Axis(1)))
        {
            for mut row in p.rows_mut() {
                row.assign(&weights);
            }
        }
        Self::new(variances, transition, probabilities)
    }

    /// Number of variables N.
    pub fn n_variables(&self) -> usize {
        self.variances.len_of(Axis(0))
    }

    /// Number of regimes / components M.
    pub fn n_regimes(&self) -> usize {
        self.variances.len_of(Axis(1))
    }

    /// Number of posterior draws S.
    pub fn n_draws(&self) -> usize {
        self.variances.len_of(Axis(2))
    }

    /// `(N, M)` variances of draw `s`.
    pub fn variances(&self, s: usize) -> ArrayView2<'_, f64> {
        self.variances.index_axis(Axis(2), s)
    }

    /// `(M, M)` transition matrix of draw `s`.
    pub fn transition(&self, s: usize) -> ArrayView2<'_, f64> {
        self.transition.index_axis(Axis(2), s)
    }

    /// Terminal regime distribution of draw `s`.
    pub fn terminal(&self, s: usize) -> ArrayView1<'_, f64> {
        self.terminal.column(s)
    }
}

/// Parameterization of the stochastic-volatility process used in estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SVParameterization {
    /// `σ²_t = exp(ω h_t)`, `h_t = g h_{t−1} + v_t`, `v_t ~ N(0, 1)`.
    NonCentred,
    /// `σ²_t = exp(h_t)`, `h_t = g h_{t−1} + v_t`, `v_t ~ N(0, σ²_v)`.
    Centred,
}

/// Stochastic-volatility draws.
///
/// `scale` holds the loading ω (non-centred, any finite sign) or the
/// innovation variance σ²_v (centred, strictly positive).
#[derive(Debug, Clone, PartialEq)]
pub struct SVDraws {
    persistence: Array2<f64>,
    scale: Array2<f64>,
    terminal_log_volatility: Array2<f64>,
    parameterization: SVParameterization,
}

impl SVDraws {
    /// Build stochastic-volatility draws.
    ///
    /// # Arguments
    /// - `persistence`: `(N, S)` AR coefficients g.
    /// - `scale`: `(N, S)` ω or σ²_v depending on `parameterization`.
    /// - `terminal_log_volatility`: `(N, S)` smoothed `h_{n,T}`.
    /// - `parameterization`: must match the estimation run.
    ///
    /// # Errors
    /// - [`ForecastError::ShapeMismatch`] if the three arrays differ in shape.
    /// - [`ForecastError::InvalidParameter`] for non-finite entries, or for
    ///   non-positive σ²_v under [`SVParameterization::Centred`].
    pub fn new(
        persistence: Array2<f64>, scale: Array2<f64>, terminal_log_volatility: Array2<f64>,
        parameterization: SVParameterization,
    ) -> ForecastResult<Self> {
        validate_shape("SV scale", scale.shape(), persistence.shape())?;
        validate_shape(
            "SV terminal log-volatility",
            terminal_log_volatility.shape(),
            persistence.shape(),
        )?;
        validate_finite_draws("SV persistence", persistence.view().into_dyn())?;
        match parameterization {
            SVParameterization::NonCentred => {
                validate_finite_draws("SV scale", scale.view().into_dyn())?
            }
            SVParameterization::Centred => {
                validate_positive_draws("SV scale", scale.view().into_dyn())?
            }
        }
        validate_finite_draws(
            "SV terminal log-volatility",
            terminal_log_volatility.view().into_dyn(),
        )?;
        Ok(SVDraws { persistence, scale, terminal_log_volatility, parameterization })
    }

    pub fn n_variables(&self) -> usize {
        self.persistence.nrows()
    }

    pub fn n_draws(&self) -> usize {
        self.persistence.ncols()
    }

    pub fn persistence(&self, s: usize) -> ArrayView1<'_, f64> {
        self.persistence.column(s)
    }

    pub fn scale(&self, s: usize) -> ArrayView1<'_, f64> {
        self.scale.column(s)
    }

    pub fn terminal_log_volatility(&self, s: usize) -> ArrayView1<'_, f64> {
        self.terminal_log_volatility.column(s)
    }

    pub fn parameterization(&self) -> SVParameterization {
        self.parameterization
    }
}

/// Student-t scale-mixture draws: one degrees-of-freedom value per draw.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentTDraws {
    degrees_of_freedom: Array1<f64>,
}

impl StudentTDraws {
    /// # Errors
    /// - [`ForecastError::InvalidParameter`] if any ν is non-finite or ≤ 0.
    pub fn new(degrees_of_freedom: Array1<f64>) -> ForecastResult<Self> {
        validate_positive_draws("degrees of freedom", degrees_of_freedom.view().into_dyn())?;
        Ok(StudentTDraws { degrees_of_freedom })
    }

    pub fn n_draws(&self) -> usize {
        self.degrees_of_freedom.len()
    }

    pub fn degrees_of_freedom(&self, s: usize) -> f64 {
        self.degrees_of_freedom[s]
    }
}

// ---- Helper methods ----

fn check_draw_count(what: &'static str, actual: usize, expected: usize) -> ForecastResult<()> {
    if actual != expected {
        return Err(ForecastError::DrawCountMismatch { what, expected, actual });
    }
    Ok(())
}
