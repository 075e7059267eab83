//! Forecast options — seeding, parallelism, logging, and numerical tolerances.
//!
//! Purpose
//! -------
//! Collect the run-time knobs of a forecast call in one validated struct so the
//! simulation layers receive explicit settings instead of ad-hoc arguments.
//!
//! Key behaviors
//! -------------
//! - [`ForecastOptions`] carries the base RNG seed, an optional dedicated
//!   thread count, a verbosity flag, and the tolerances of the structural
//!   inversion and constraint checks.
//! - `ForecastOptions::logger` (feature `obs_slog`, on by default) builds the
//!   structured logger used by the entry point: an asynchronous terminal
//!   drain when `verbose`, otherwise a discarding root. Without the feature
//!   `verbose` has no effect.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tolerances are finite and strictly positive; `n_threads`, when set, is at
//!   least one. Both are enforced by [`ForecastOptions::new`] and re-checked
//!   by [`ForecastOptions::validate`] at the start of every forecast.
//! - Logging is a side channel: nothing logged depends on, or alters, the
//!   random streams.
//!
//! Conventions
//! -----------
//! - `seed = None` draws a single base seed from the thread-local generator
//!   at call time; per-draw streams are then derived from it exactly as for an
//!   explicit seed.
use crate::forecast::errors::{ForecastError, ForecastResult};
#[cfg(feature = "obs_slog")]
use slog::{Drain, Logger, o};

/// Default reciprocal-condition-number threshold for `B_s`.
pub const DEFAULT_SINGULAR_TOL: f64 = 1e-12;

/// Default relative tolerance of the constraint consistency check.
pub const DEFAULT_CONSTRAINT_TOL: f64 = 1e-8;

/// ForecastOptions — run-time configuration of a forecast call.
///
/// Fields
/// ------
/// - `seed`: `Option<u64>`
///   Base seed; draw `s` uses the stream seeded with `seed + s` (wrapping).
/// - `n_threads`: `Option<usize>`
///   Size of a dedicated worker pool. `None` uses the global rayon pool.
/// - `verbose`: `bool`
///   Emit progress and failure records to the terminal.
/// - `constraint_tol`: `f64`
///   Relative tolerance for conditional-forecast consistency.
/// - `singular_tol`: `f64`
///   Threshold on `σ_min / σ_max` below which `B_s` counts as singular.
///
/// Notes
/// -----
/// - Defaults: `seed = Some(42)`, `n_threads = None`, `verbose = false`,
///   `constraint_tol = 1e-8`, `singular_tol = 1e-12`.
/// - Results are bit-identical for any `n_threads` given the same seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOptions {
    pub seed: Option<u64>,
    pub n_threads: Option<usize>,
    pub verbose: bool,
    pub constraint_tol: f64,
    pub singular_tol: f64,
}

impl ForecastOptions {
    /// Construct validated options.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::InvalidOption` if a tolerance is non-finite or
    ///   non-positive, or if `n_threads == Some(0)`.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use svar_forecast::forecast::core::options::ForecastOptions;
    /// let opts = ForecastOptions::new(Some(7), Some(2), false, 1e-8, 1e-12).unwrap();
    /// assert_eq!(opts.seed, Some(7));
    /// assert!(ForecastOptions::new(None, Some(0), false, 1e-8, 1e-12).is_err());
    /// ```
    pub fn new(
        seed: Option<u64>, n_threads: Option<usize>, verbose: bool, constraint_tol: f64,
        singular_tol: f64,
    ) -> ForecastResult<Self> {
        let opts = ForecastOptions { seed, n_threads, verbose, constraint_tol, singular_tol };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check the invariants of options that may have been built as a
    /// struct literal or mutated after construction.
    ///
    /// Errors
    /// ------
    /// Same as [`ForecastOptions::new`].
    pub fn validate(&self) -> ForecastResult<()> {
        for (what, value) in
            [("constraint_tol", self.constraint_tol), ("singular_tol", self.singular_tol)]
        {
            if !(value.is_finite() && value > 0.0) {
                return Err(ForecastError::InvalidOption { what, value });
            }
        }
        if self.n_threads == Some(0) {
            return Err(ForecastError::InvalidOption { what: "n_threads", value: 0.0 });
        }
        Ok(())
    }

    /// Build the logger for one forecast call (feature `obs_slog`).
    ///
    /// Returns a terminal logger behind a non-blocking `slog-async` drain when
    /// `verbose` is set and a `slog::Discard` root otherwise.
    #[cfg(feature = "obs_slog")]
    pub fn logger(&self) -> Logger {
        if !self.verbose {
            return Logger::root(slog::Discard, o!());
        }
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!("component" => "svar_forecast"))
    }
}

impl Default for ForecastOptions {
    fn default() -> Self {
        ForecastOptions {
            seed: Some(42),
            n_threads: None,
            verbose: false,
            constraint_tol: DEFAULT_CONSTRAINT_TOL,
            singular_tol: DEFAULT_SINGULAR_TOL,
        }
    }
}
