//! Conditioning validator — normalize the forecast horizon, exogenous forecast,
//! and conditional-forecast matrix against the model dimensions.
//!
//! Purpose
//! -------
//! Turn the raw, optional per-call inputs of a forecast into a validated,
//! immutable [`ForecastRequest`] so the simulation layers can index rows by
//! horizon without re-checking shapes or values.
//!
//! Key behaviors
//! -------------
//! - Reject a zero horizon.
//! - With `d = 0` exogenous regressors, ignore any exogenous input and store an
//!   `H × 1` placeholder of missing markers (`NaN`).
//! - With `d > 0`, require an exogenous forecast of shape exactly `H × d` with
//!   finite entries.
//! - Replace an absent conditional forecast by an `H × N` matrix of free
//!   sentinels; otherwise require shape `H × N` and reject ±∞ entries.
//!
//! Invariants & assumptions
//! ------------------------
//! - `NaN` is the free sentinel of the conditional-forecast matrix: a `NaN`
//!   entry leaves that variable unconstrained, every finite entry is a hard
//!   constraint on the simulated value.
//! - Validation happens once per call, before any allocation for simulation.
//!
//! Conventions
//! -----------
//! - Row `h` of every matrix refers to forecast step `h + 1` (0-based rows).
//! - Columns of the conditional forecast follow the variable order of `Y`.
//!
//! Downstream usage
//! ----------------
//! - Built by `forecast::models::forecast` and consumed read-only by the
//!   predictive path simulator through [`ForecastRequest::exogenous_row`] and
//!   [`ForecastRequest::constrained`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover every error branch, the placeholder substitution, and
//!   constrained-coordinate extraction.
use crate::forecast::{
    core::{
        shape::SVARShape,
        validation::{validate_finite_matrix, validate_shape},
    },
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array2, ArrayView1};

/// ForecastRequest — validated per-call forecast inputs.
///
/// Fields
/// ------
/// - `horizon`: `usize`
///   Number of steps H ≥ 1.
/// - `exogenous`: `Array2<f64>`
///   `H × d` exogenous forecast, or an `H × 1` `NaN` placeholder when `d = 0`.
/// - `conditional`: `Array2<f64>`
///   `H × N` conditional forecast; `NaN` marks a free coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    horizon: usize,
    exogenous: Array2<f64>,
    conditional: Array2<f64>,
}

impl ForecastRequest {
    /// Validate and normalize raw forecast inputs.
    ///
    /// Parameters
    /// ----------
    /// - `horizon`: `usize`
    ///   Forecast horizon H. Must be positive.
    /// - `exogenous`: `Option<Array2<f64>>`
    ///   Future values of the exogenous regressors, one row per horizon.
    ///   Required iff `shape.d > 0`.
    /// - `conditional`: `Option<Array2<f64>>`
    ///   Known future values of the endogenous variables, `NaN` = free.
    /// - `shape`: `&SVARShape`
    ///   Model dimensions supplying N and d.
    ///
    /// Returns
    /// -------
    /// `ForecastResult<ForecastRequest>`
    ///   The normalized request.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::InvalidHorizon` if `horizon == 0`.
    /// - `ForecastError::MissingExogenousForecast` if `d > 0` and `exogenous`
    ///   is `None`.
    /// - `ForecastError::ShapeMismatch` if a present matrix has the wrong
    ///   shape (`H × d` or `H × N`).
    /// - `ForecastError::InvalidValue` for `NaN`/±∞ exogenous entries or ±∞
    ///   conditional entries.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use svar_forecast::forecast::core::{conditioning::ForecastRequest, shape::SVARShape};
    /// let shape = SVARShape::new(2, 1, 0, true).unwrap();
    /// let cond = array![[5.0, f64::NAN], [f64::NAN, f64::NAN]];
    /// let request = ForecastRequest::new(2, None, Some(cond), &shape).unwrap();
    /// assert_eq!(request.constrained(0), vec![(0, 5.0)]);
    /// assert!(request.constrained(1).is_empty());
    /// ```
    pub fn new(
        horizon: usize, exogenous: Option<Array2<f64>>, conditional: Option<Array2<f64>>,
        shape: &SVARShape,
    ) -> ForecastResult<ForecastRequest> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon { horizon });
        }

        let exogenous = if shape.d == 0 {
            Array2::from_elem((horizon, 1), f64::NAN)
        } else {
            let exogenous =
                exogenous.ok_or(ForecastError::MissingExogenousForecast { d: shape.d })?;
            validate_shape("exogenous forecast", exogenous.shape(), &[horizon, shape.d])?;
            validate_finite_matrix("exogenous forecast", exogenous.view())?;
            exogenous
        };

        let conditional = match conditional {
            None => Array2::from_elem((horizon, shape.n), f64::NAN),
            Some(conditional) => {
                validate_shape("conditional forecast", conditional.shape(), &[horizon, shape.n])?;
                if let Some(((row, col), &value)) =
                    conditional.indexed_iter().find(|(_, v)| v.is_infinite())
                {
                    return Err(ForecastError::InvalidValue {
                        what: "conditional forecast",
                        row,
                        col,
                        value,
                    });
                }
                conditional
            }
        };

        Ok(ForecastRequest { horizon, exogenous, conditional })
    }

    /// Forecast horizon H.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Exogenous values for 0-based forecast step `h`.
    pub fn exogenous_row(&self, h: usize) -> ArrayView1<'_, f64> {
        self.exogenous.row(h)
    }

    /// Full normalized exogenous matrix (placeholder when `d = 0`).
    pub fn exogenous(&self) -> &Array2<f64> {
        &self.exogenous
    }

    /// Full normalized conditional-forecast matrix.
    pub fn conditional(&self) -> &Array2<f64> {
        &self.conditional
    }

    /// Constrained coordinates `(variable, value)` at 0-based step `h`.
    pub fn constrained(&self, h: usize) -> Vec<(usize, f64)> {
        self.conditional
            .row(h)
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(n, &v)| (n, v))
            .collect()
    }

    /// Total number of hard constraints over all horizons.
    pub fn n_constraints(&self) -> usize {
        self.conditional.iter().filter(|v| !v.is_nan()).count()
    }

    /// Whether any future value is pinned.
    pub fn has_constraints(&self) -> bool {
        self.n_constraints() > 0
    }
}
