//! models — per-draw predictive simulation, result aggregation, and the
//! parallel forecast entry point.
//!
//! Purpose
//! -------
//! Compose the `forecast::core` building blocks into the posterior predictive
//! pipeline: [`simulate_draw`] produces one draw's path and covariances,
//! [`ForecastBundle`] stacks draws in order, and [`forecast`] validates a call
//! and runs every draw in parallel with reproducible per-draw streams.
//!
//! Downstream usage
//! ----------------
//! - Most callers only need [`forecast`] and [`ForecastBundle`], also
//!   available through [`prelude`].

pub mod bundle;
pub mod forecast;
pub mod predictive;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bundle::ForecastBundle;
pub use self::forecast::forecast;
pub use self::predictive::{DrawForecast, simulate_draw};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use svar_forecast::forecast::models::prelude::*;
//
// to import the forecasting surface in a single line.

pub mod prelude {
    pub use super::bundle::ForecastBundle;
    pub use super::forecast::forecast;
}
