//! Last in-sample state — the regressor vector and history a forecast starts
//! from.
//!
//! Purpose
//! -------
//! Hold the last in-sample regressor vector `x_T`, the historical data matrix
//! `Y` (retained for output packaging), and the model dimensions, and provide
//! the lag-shifting update that turns a regressor into the next period's.
//!
//! Key behaviors
//! -------------
//! - [`LastInSampleState::new`] validates a caller-supplied `x_T` against `Y`
//!   and the dimensions.
//! - [`LastInSampleState::from_data`] builds `x_T` from `Y` (and the in-sample
//!   exogenous matrix) for callers that do not keep the design matrix.
//! - [`advance_regressor`] shifts the lag blocks down by one, inserts the
//!   newest observation, and writes the exogenous values of the new period.
//!
//! Invariants & assumptions
//! ------------------------
//! - Regressor layout: `x_t = (y_{t−1}, …, y_{t−p}, 1, z_t)` with the
//!   intercept present iff `shape.constant`.
//! - `x_T` is the regressor of the last in-sample period `T`; the first
//!   forecast regressor is obtained by advancing it with `y_T` (the last
//!   column of `Y`).
//! - All stored values are finite.
use crate::forecast::{
    core::{
        shape::SVARShape,
        validation::{validate_finite_matrix, validate_shape},
    },
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array1, Array2, ArrayView1, Axis, s};

/// LastInSampleState — starting point of the forecast recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct LastInSampleState {
    x_last: Array1<f64>,
    y: Array2<f64>,
    shape: SVARShape,
}

impl LastInSampleState {
    /// Construct the state from an explicit last regressor vector.
    ///
    /// Parameters
    /// ----------
    /// - `x_last`: `Array1<f64>`
    ///   Regressor `x_T` of length `K = N·p + const + d`.
    /// - `y`: `Array2<f64>`
    ///   Historical data, `N × T` with `T ≥ 1`.
    /// - `shape`: `SVARShape`
    ///   Model dimensions.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::ShapeMismatch` if `x_last.len() != K` or `Y` does not
    ///   have N rows.
    /// - `ForecastError::InsufficientHistory` if `Y` has no columns.
    /// - `ForecastError::InvalidValue` on non-finite entries.
    /// - Errors of [`SVARShape::validate`] for a shape built as a literal.
    pub fn new(x_last: Array1<f64>, y: Array2<f64>, shape: SVARShape) -> ForecastResult<Self> {
        shape.validate()?;
        validate_shape("last regressor", x_last.shape(), &[shape.k()])?;
        if y.nrows() != shape.n {
            return Err(ForecastError::ShapeMismatch {
                what: "historical data",
                expected: vec![shape.n, y.ncols()],
                actual: y.shape().to_vec(),
            });
        }
        if y.ncols() == 0 {
            return Err(ForecastError::InsufficientHistory { required: 1, actual: 0 });
        }
        validate_finite_matrix("historical data", y.view())?;
        validate_finite_matrix("last regressor", x_last.view().insert_axis(Axis(0)))?;
        Ok(LastInSampleState { x_last, y, shape })
    }

    /// Build the state from historical data, constructing `x_T` directly.
    ///
    /// Parameters
    /// ----------
    /// - `y`: `Array2<f64>`
    ///   Historical data, `N × T`.
    /// - `exogenous`: `Option<Array2<f64>>`
    ///   In-sample exogenous regressors, `T × d`; `None` means `d = 0`.
    /// - `p`: `usize`
    ///   Lag order.
    /// - `constant`: `bool`
    ///   Whether the model carries an intercept.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::InsufficientHistory` unless `T > p`.
    /// - `ForecastError::ShapeMismatch` if `exogenous` does not have T rows.
    /// - Any error of [`SVARShape::new`] or [`LastInSampleState::new`].
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use svar_forecast::forecast::core::state::LastInSampleState;
    /// let y = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    /// let state = LastInSampleState::from_data(y, None, 2, true).unwrap();
    /// // x_T = (y_{T−1}, y_{T−2}, 1)
    /// assert_eq!(state.x_last().to_vec(), vec![2.0, 5.0, 1.0, 4.0, 1.0]);
    /// ```
    pub fn from_data(
        y: Array2<f64>, exogenous: Option<Array2<f64>>, p: usize, constant: bool,
    ) -> ForecastResult<Self> {
        let d = exogenous.as_ref().map_or(0, |z| z.ncols());
        let shape = SVARShape::new(y.nrows(), p, d, constant)?;
        let t = y.ncols();
        if t <= p {
            return Err(ForecastError::InsufficientHistory { required: p + 1, actual: t });
        }
        let mut x_last = Array1::<f64>::zeros(shape.k());
        for lag in 1..=p {
            let block = (lag - 1) * shape.n;
            x_last.slice_mut(s![block..block + shape.n]).assign(&y.column(t - 1 - lag));
        }
        if constant {
            x_last[shape.n * p] = 1.0;
        }
        if let Some(z) = exogenous {
            validate_shape("in-sample exogenous data", z.shape(), &[t, d])?;
            let offset = shape.exogenous_offset();
            x_last.slice_mut(s![offset..offset + d]).assign(&z.row(t - 1));
        }
        LastInSampleState::new(x_last, y, shape)
    }

    /// Last in-sample regressor `x_T`.
    pub fn x_last(&self) -> ArrayView1<'_, f64> {
        self.x_last.view()
    }

    /// Historical data `Y` (N × T).
    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Last observation `y_T`.
    pub fn y_last(&self) -> ArrayView1<'_, f64> {
        self.y.column(self.y.ncols() - 1)
    }

    /// Model dimensions.
    pub fn shape(&self) -> &SVARShape {
        &self.shape
    }
}

/// Roll a regressor vector forward by one period in place.
///
/// The lag blocks shift down (`y_{t−j}` becomes `y_{t−j−1}`, the oldest block
/// is dropped), `newest` becomes the first block, the intercept is reset to 1
/// and the exogenous block is overwritten with `exogenous` (ignored if
/// `shape.d == 0`).
pub fn advance_regressor(
    x: &mut Array1<f64>, newest: ArrayView1<f64>, exogenous: ArrayView1<f64>, shape: &SVARShape,
) {
    let n = shape.n;
    for i in (n..n * shape.p).rev() {
        x[i] = x[i - n];
    }
    x.slice_mut(s![..n]).assign(&newest);
    if shape.constant {
        x[n * shape.p] = 1.0;
    }
    if shape.d > 0 {
        let offset = shape.exogenous_offset();
        x.slice_mut(s![offset..offset + shape.d]).assign(&exogenous);
    }
}
