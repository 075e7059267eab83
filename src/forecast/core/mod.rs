//! core — validated inputs, variance processes, and per-step numerics for
//! SVAR posterior predictive forecasting.
//!
//! Purpose
//! -------
//! Collect the building blocks the forecast models are assembled from: model
//! dimensions, posterior-draw containers, the last in-sample state, request
//! validation, the per-variant volatility forecaster, structural-shock
//! sampling (unconstrained and conditioned), dense linear algebra, and
//! run-time options.
//!
//! Key behaviors
//! -------------
//! - Validate every external input once ([`ForecastRequest`],
//!   [`PosteriorDraws`], [`LastInSampleState`], [`ForecastOptions`]) so the
//!   simulation layer can index by draw and horizon without re-checking.
//! - Dispatch volatility forecasting over the closed variant set
//!   [`Heteroskedasticity`].
//! - Draw structural shocks and condition them exactly on pinned future
//!   values ([`draw_shocks`], [`condition_shocks`]).
//! - Invert structural matrices with a conditioning check
//!   ([`invert_structural`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Posterior arrays carry the draw index on their last axis and are never
//!   reordered.
//! - Every function taking a generator consumes it in a fixed order that
//!   depends only on the draw's inputs.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; horizon `h` is forecast step `h + 1`.
//! - This module performs no logging; errors are reported as
//!   [`ForecastResult`](crate::forecast::errors::ForecastResult).
//!
//! Downstream usage
//! ----------------
//! - `forecast::models` composes these pieces into the per-draw simulator and
//!   the parallel entry point.

pub mod conditioning;
pub mod draws;
pub mod linalg;
pub mod options;
pub mod params;
pub mod shape;
pub mod shocks;
pub mod state;
pub mod validation;
pub mod volatility;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::conditioning::ForecastRequest;
pub use self::draws::PosteriorDraws;
pub use self::linalg::invert_structural;
pub use self::options::ForecastOptions;
pub use self::params::{RegimeDraws, SVDraws, SVParameterization, StudentTDraws};
pub use self::shape::SVARShape;
pub use self::shocks::{ShockConstraint, condition_shocks, draw_shocks};
pub use self::state::{LastInSampleState, advance_regressor};
pub use self::volatility::Heteroskedasticity;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use svar_forecast::forecast::core::prelude::*;
//
// to import the input and configuration types in a single line.

pub mod prelude {
    pub use super::conditioning::ForecastRequest;
    pub use super::draws::PosteriorDraws;
    pub use super::options::ForecastOptions;
    pub use super::params::{RegimeDraws, SVDraws, SVParameterization, StudentTDraws};
    pub use super::shape::SVARShape;
    pub use super::state::LastInSampleState;
    pub use super::volatility::Heteroskedasticity;
}
