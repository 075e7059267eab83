//! forecast — posterior predictive forecasting for structural VARs with
//! heteroskedastic shocks.
//!
//! Purpose
//! -------
//! Draw samples from the joint posterior predictive density of an SVAR
//! `B y_t = B A x_t + u_t` given posterior draws of `(A, B)` and of the
//! structural variance process, optionally with exogenous regressors and
//! hard conditional-forecast constraints on some future values.
//!
//! Key behaviors
//! -------------
//! - Validate the horizon, exogenous forecast, and conditional forecast
//!   against the model dimensions before any simulation work.
//! - Forecast structural variances per draw for the homoskedastic,
//!   Markov-switching, mixture, stochastic-volatility, and Student-t variants.
//! - Propagate the VAR recursion forward per draw, conditioning shocks
//!   exactly on pinned values, and record reduced-form covariances.
//! - Run draws in parallel with per-draw random streams so results do not
//!   depend on the thread count.
//!
//! Invariants & assumptions
//! ------------------------
//! - Posterior draws and the last in-sample state are immutable inputs;
//!   output slice `s` always belongs to posterior draw `s`.
//! - A call either returns a complete [`ForecastBundle`] or an error; draws
//!   are never dropped.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. Posterior arrays carry the draw on their last axis;
//!   forecast horizon index `h` is step `T + h + 1`.
//! - `NaN` in a conditional forecast means "free".
//! - Errors are [`ForecastError`] values grouped by [`ForecastErrorKind`].
//!
//! Downstream usage
//! ----------------
//! 1. Wrap posterior output in [`PosteriorDraws`] with the matching
//!    [`Heteroskedasticity`] variant.
//! 2. Build a [`LastInSampleState`] (explicit `x_T` or
//!    [`LastInSampleState::from_data`]).
//! 3. Call [`forecast`] with the horizon, optional exogenous and conditional
//!    forecasts, and [`ForecastOptions`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each component in [`core`] and [`models`];
//!   `tests/integration_forecast_pipeline.rs` exercises the public pipeline
//!   end to end.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ForecastOptions, ForecastRequest, Heteroskedasticity, LastInSampleState, PosteriorDraws,
    RegimeDraws, SVARShape, SVDraws, SVParameterization, StudentTDraws,
};

pub use self::errors::{ForecastError, ForecastErrorKind, ForecastResult};

pub use self::models::{ForecastBundle, forecast};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use svar_forecast::forecast::prelude::*;
//
// to import the forecasting surface in a single line.

pub mod prelude {
    pub use super::{
        ForecastBundle, ForecastError, ForecastErrorKind, ForecastOptions, ForecastRequest,
        ForecastResult, Heteroskedasticity, LastInSampleState, PosteriorDraws, RegimeDraws,
        SVARShape, SVDraws, SVParameterization, StudentTDraws, forecast,
    };
}
