//! Errors for SVAR posterior predictive forecasting (request validation,
//! posterior-draw checks, per-draw numerical failures, and runtime setup).
//!
//! This module defines the forecast error type, [`ForecastError`], and a
//! coarse classification, [`ForecastErrorKind`], that groups variants into the
//! five failure families callers usually branch on (dimension, missing input,
//! invalid value, singular structural matrix, infeasible constraint). Both
//! implement `Display`; `ForecastError` implements `Error` and converts to
//! `PyErr` when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy). Draw index `draw` is the
//!   position `s` along the last axis of the posterior arrays; `horizon` is
//!   the 0-based forecast step (`0` is the one-step-ahead forecast).
//! - Shapes are reported in the array's own axis order, e.g. `(N, K, S)` for
//!   the autoregressive draws.
//! - Validation failures are raised before any simulation work starts;
//!   numerical failures carry the draw (and horizon) that triggered them.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for forecasting operations that may produce
/// [`ForecastError`].
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Coarse failure family of a [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastErrorKind {
    /// Shape or size mismatch against the model dimensions.
    Dimension,
    /// A required input (exogenous forecast) is absent.
    MissingInput,
    /// Non-finite, missing, or out-of-domain entries where none are allowed.
    InvalidValue,
    /// A posterior draw of `B` cannot be inverted.
    SingularStructuralMatrix,
    /// Conditional-forecast constraints cannot be met for a draw and period.
    InfeasibleConstraint,
    /// Execution environment failures (thread pool construction).
    Runtime,
}

/// Unified error type for SVAR forecasting.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    // ---- Dimension errors ----
    /// Forecast horizon must be a positive integer.
    InvalidHorizon { horizon: usize },

    /// An input array does not have the shape implied by the model.
    ShapeMismatch { what: &'static str, expected: Vec<usize>, actual: Vec<usize> },

    /// Two posterior arrays disagree on the number of draws S.
    DrawCountMismatch { what: &'static str, expected: usize, actual: usize },

    /// Lag order must be at least one.
    InvalidLagOrder { p: usize },

    /// Historical sample too short to build the last regressor vector.
    InsufficientHistory { required: usize, actual: usize },

    // ---- Missing inputs ----
    /// Model has `d > 0` exogenous regressors but no exogenous forecast was given.
    MissingExogenousForecast { d: usize },

    // ---- Invalid values ----
    /// An input matrix holds a non-finite or missing entry at `(row, col)`.
    InvalidValue { what: &'static str, row: usize, col: usize, value: f64 },

    /// A variant parameter draw violates its domain (positivity, stochasticity, ...).
    InvalidParameter { what: &'static str, draw: usize, value: f64, reason: &'static str },

    /// A tuning option is outside its admissible range.
    InvalidOption { what: &'static str, value: f64 },

    /// Forecast variance overflowed or underflowed for a draw and horizon.
    NonFiniteVolatility { draw: usize, horizon: usize, value: f64 },

    // ---- Per-draw numerical failures ----
    /// Structural matrix `B_s` is numerically singular.
    SingularStructuralMatrix { draw: usize },

    /// Constraint system for a period is inconsistent for this draw.
    InfeasibleConstraint { draw: usize, horizon: usize, residual: f64 },

    // ---- Runtime ----
    /// Dedicated rayon pool could not be created.
    ThreadPool { reason: String },
}

impl ForecastError {
    /// Map the variant onto its [`ForecastErrorKind`].
    pub fn kind(&self) -> ForecastErrorKind {
        match self {
            ForecastError::InvalidHorizon { .. }
            | ForecastError::ShapeMismatch { .. }
            | ForecastError::DrawCountMismatch { .. }
            | ForecastError::InvalidLagOrder { .. }
            | ForecastError::InsufficientHistory { .. } => ForecastErrorKind::Dimension,
            ForecastError::MissingExogenousForecast { .. } => ForecastErrorKind::MissingInput,
            ForecastError::InvalidValue { .. }
            | ForecastError::InvalidParameter { .. }
            | ForecastError::InvalidOption { .. }
            | ForecastError::NonFiniteVolatility { .. } => ForecastErrorKind::InvalidValue,
            ForecastError::SingularStructuralMatrix { .. } => {
                ForecastErrorKind::SingularStructuralMatrix
            }
            ForecastError::InfeasibleConstraint { .. } => ForecastErrorKind::InfeasibleConstraint,
            ForecastError::ThreadPool { .. } => ForecastErrorKind::Runtime,
        }
    }
}

impl std::error::Error for ForecastError {}

impl std::fmt::Display for ForecastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Dimension errors ----
            ForecastError::InvalidHorizon { horizon } => {
                write!(f, "Forecast horizon must be a positive integer; got: {horizon}")
            }
            ForecastError::ShapeMismatch { what, expected, actual } => {
                write!(f, "{what} has shape {actual:?}; expected {expected:?}")
            }
            ForecastError::DrawCountMismatch { what, expected, actual } => {
                write!(f, "{what} holds {actual} posterior draws; expected {expected}")
            }
            ForecastError::InvalidLagOrder { p } => {
                write!(f, "Lag order must be at least 1; got: {p}")
            }
            ForecastError::InsufficientHistory { required, actual } => {
                write!(
                    f,
                    "Historical sample has {actual} observations; at least {required} are required"
                )
            }
            // ---- Missing inputs ----
            ForecastError::MissingExogenousForecast { d } => {
                write!(
                    f,
                    "Model has {d} exogenous regressors but no exogenous forecast was provided"
                )
            }
            // ---- Invalid values ----
            ForecastError::InvalidValue { what, row, col, value } => {
                write!(f, "{what} entry at ({row}, {col}) is not a valid number: {value}")
            }
            ForecastError::InvalidParameter { what, draw, value, reason } => {
                write!(f, "{what} in posterior draw {draw} is invalid ({value}): {reason}")
            }
            ForecastError::InvalidOption { what, value } => {
                write!(f, "Forecast option {what} must be finite and > 0; got: {value}")
            }
            ForecastError::NonFiniteVolatility { draw, horizon, value } => {
                write!(
                    f,
                    "Forecast variance at horizon {horizon} of posterior draw {draw} is not \
                     finite and positive: {value}"
                )
            }
            // ---- Per-draw numerical failures ----
            ForecastError::SingularStructuralMatrix { draw } => {
                write!(f, "Structural matrix B in posterior draw {draw} is numerically singular")
            }
            ForecastError::InfeasibleConstraint { draw, horizon, residual } => {
                write!(
                    f,
                    "Conditional forecast constraints at horizon {horizon} are infeasible for \
                     posterior draw {draw} (residual {residual:e})"
                )
            }
            // ---- Runtime ----
            ForecastError::ThreadPool { reason } => {
                write!(f, "Failed to build forecast thread pool: {reason}")
            }
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ForecastError {
    fn from(err: rayon::ThreadPoolBuildError) -> ForecastError {
        ForecastError::ThreadPool { reason: err.to_string() }
    }
}

/// Convert a [`ForecastError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl From<ForecastError> for PyErr {
    fn from(err: ForecastError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
