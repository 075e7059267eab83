//! Forecast entry point — parallel posterior predictive simulation.
//!
//! Purpose
//! -------
//! Validate a forecast call, run the per-draw pipeline (volatility path, then
//! predictive path) for every posterior draw in parallel, and assemble the
//! [`ForecastBundle`].
//!
//! Key behaviors
//! -------------
//! - Fail fast: the request is validated against the model dimensions, then
//!   the draws against the state, before any simulation work starts.
//! - Draw `s` runs on its own `StdRng` seeded with `base_seed + s`
//!   (wrapping), so output is bit-identical for every thread count.
//! - With `ForecastOptions::n_threads = Some(k)` the work runs inside a
//!   dedicated rayon pool of `k` threads; otherwise on the global pool.
//! - Per-draw failures abort the whole call: draws above the lowest failure
//!   seen so far are skipped, and the lowest failing draw's error is
//!   returned whatever the scheduling.
//! - Progress records go through `slog` when the `obs_slog` feature is on
//!   and `ForecastOptions::verbose` is set.
//!
//! Invariants & assumptions
//! ------------------------
//! - Posterior draws and the last state are read-only and shared across
//!   worker threads without locking.
//! - Logging never touches a generator.
//!
//! Downstream usage
//! ----------------
//! - Rust callers use [`forecast`]; the Python binding wraps the same call.
use crate::forecast::{
    core::{
        conditioning::ForecastRequest, draws::PosteriorDraws, options::ForecastOptions,
        state::LastInSampleState,
    },
    errors::ForecastResult,
    models::{
        bundle::ForecastBundle,
        predictive::{DrawForecast, simulate_draw},
    },
};
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::{ThreadPoolBuilder, prelude::*};
#[cfg(feature = "obs_slog")]
use slog::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

/// forecast — sample the joint posterior predictive density of an SVAR.
///
/// Parameters
/// ----------
/// - `draws`: `&PosteriorDraws`
///   Posterior sample of `(A, B)` and variance-process parameters.
/// - `state`: `&LastInSampleState`
///   Last regressor `x_T`, historical data `Y`, and model dimensions.
/// - `horizon`: `usize`
///   Number of forecast steps H ≥ 1.
/// - `exogenous_forecast`: `Option<Array2<f64>>`
///   `H × d` future exogenous values; required iff `d > 0`.
/// - `conditional_forecast`: `Option<Array2<f64>>`
///   `H × N` pinned future values, `NaN` = free.
/// - `options`: `&ForecastOptions`
///   Seed, threads, logging, and tolerances.
///
/// Returns
/// -------
/// `ForecastResult<ForecastBundle>`
///   Simulated paths (N × H × S), variance paths (N × H × S), covariances
///   (N × N × H × S), and `Y`.
///
/// Errors
/// ------
/// - `ForecastError::InvalidOption` if `options` violate their invariants.
/// - Validation errors from [`ForecastRequest::new`] (horizon, exogenous and
///   conditional forecasts).
/// - `ForecastError::ShapeMismatch` if the draws do not match the state's
///   dimensions.
/// - `ForecastError::ThreadPool` if a dedicated pool cannot be built.
/// - The lowest-index per-draw failure (`SingularStructuralMatrix`,
///   `InfeasibleConstraint`, `NonFiniteVolatility`).
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::{Array3, array};
/// # use svar_forecast::forecast::prelude::*;
/// let mut b = Array3::<f64>::zeros((2, 2, 3));
/// for s in 0..3 {
///     b[[0, 0, s]] = 1.0;
///     b[[1, 1, s]] = 1.0;
/// }
/// let a = Array3::<f64>::from_elem((2, 3, 3), 0.1);
/// let draws = PosteriorDraws::new(a, b, Heteroskedasticity::Homoskedastic).unwrap();
/// let y = array![[0.0, 1.0], [0.5, -0.5]];
/// let state = LastInSampleState::from_data(y, None, 1, true).unwrap();
///
/// let bundle = forecast(&draws, &state, 2, None, None, &ForecastOptions::default()).unwrap();
/// assert_eq!(bundle.forecasts.dim(), (2, 2, 3));
/// assert_eq!(bundle.forecast_covariance.dim(), (2, 2, 2, 3));
/// ```
pub fn forecast(
    draws: &PosteriorDraws, state: &LastInSampleState, horizon: usize,
    exogenous_forecast: Option<Array2<f64>>, conditional_forecast: Option<Array2<f64>>,
    options: &ForecastOptions,
) -> ForecastResult<ForecastBundle> {
    options.validate()?;
    let shape = state.shape();
    let request = ForecastRequest::new(horizon, exogenous_forecast, conditional_forecast, shape)?;
    draws.check_shape(shape)?;

    let heteroskedasticity = draws.heteroskedasticity();
    let base_seed = options.seed.unwrap_or_else(|| rand::rng().random::<u64>());
    #[cfg(feature = "obs_slog")]
    let logger = options.logger();
    #[cfg(feature = "obs_slog")]
    info!(logger, "starting posterior predictive simulation";
        "n" => shape.n,
        "k" => shape.k(),
        "horizon" => horizon,
        "draws" => draws.n_draws(),
        "variant" => heteroskedasticity.name(),
        "constraints" => request.n_constraints(),
        "threads" => options.n_threads.map_or_else(|| "global".to_string(), |k| k.to_string())
    );
    #[cfg(feature = "obs_slog")]
    debug!(logger, "per-draw streams"; "base_seed" => base_seed);

    let run = || run_draws(draws, state, &request, options, base_seed);
    let results = match options.n_threads {
        Some(threads) => ThreadPoolBuilder::new().num_threads(threads).build()?.install(run),
        None => run(),
    };

    // Skipped draws sit above a failed one, so the first error stays in front.
    let results: Vec<ForecastResult<DrawForecast>> = results.into_iter().flatten().collect();
    #[cfg(feature = "obs_slog")]
    if let Some(err) = results.iter().find_map(|r| r.as_ref().err()) {
        warn!(logger, "forecast aborted";
            "failed_draws" => results.iter().filter(|r| r.is_err()).count(),
            "skipped_draws" => draws.n_draws() - results.len(),
            "first_error" => %err
        );
    }
    let bundle = ForecastBundle::from_draws(
        results,
        shape.n,
        horizon,
        state.y().view(),
        heteroskedasticity.is_heteroskedastic(),
    )?;
    #[cfg(feature = "obs_slog")]
    info!(logger, "posterior predictive simulation finished"; "draws" => bundle.n_draws());
    Ok(bundle)
}

/// Run every draw on the current rayon pool, in draw order.
///
/// Entry `s` is `None` when draw `s` was skipped because a draw with a lower
/// index had already failed. The lowest failing draw itself is never skipped,
/// since only failures below it can gate it.
fn run_draws(
    draws: &PosteriorDraws, state: &LastInSampleState, request: &ForecastRequest,
    options: &ForecastOptions, base_seed: u64,
) -> Vec<Option<ForecastResult<DrawForecast>>> {
    let first_failure = AtomicUsize::new(usize::MAX);
    (0..draws.n_draws())
        .into_par_iter()
        .map(|s| {
            if first_failure.load(Ordering::Relaxed) < s {
                return None;
            }
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(s as u64));
            let result = simulate_draw(draws, state, request, options, s, &mut rng);
            if result.is_err() {
                first_failure.fetch_min(s, Ordering::Relaxed);
            }
            Some(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{
        core::{
            params::{SVDraws, SVParameterization},
            shape::SVARShape,
            volatility::Heteroskedasticity,
        },
        errors::ForecastError,
    };
    use ndarray::{Array3, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation order (request before draw/state compatibility).
    // - Seeding: bit-identical output across thread counts, and distinct
    //   output for distinct seeds.
    // - Entropy seeding when no seed is given.
    // - Early abort: lowest failing draw reported, later draws skipped.
    // - Re-validation of options built as struct literals.
    //
    // They intentionally DO NOT cover:
    // - Numerical properties of single draws (`models::predictive`).
    // -------------------------------------------------------------------------

    fn sv_model(s: usize) -> (PosteriorDraws, LastInSampleState) {
        let a = Array3::<f64>::from_elem((2, 3, s), 0.2);
        let mut b = Array3::<f64>::zeros((2, 2, s));
        for draw in 0..s {
            b[[0, 0, draw]] = 1.0 + draw as f64 * 0.1;
            b[[1, 0, draw]] = 0.3;
            b[[1, 1, draw]] = 2.0;
        }
        let sv = SVDraws::new(
            Array2::from_elem((2, s), 0.9),
            Array2::from_elem((2, s), 0.3),
            Array2::zeros((2, s)),
            SVParameterization::NonCentred,
        )
        .unwrap();
        let draws =
            PosteriorDraws::new(a, b, Heteroskedasticity::StochasticVolatility(sv)).unwrap();
        let y = array![[0.1, 0.4, -0.2], [1.0, 0.8, 0.9]];
        let state = LastInSampleState::from_data(y, None, 1, true).unwrap();
        (draws, state)
    }

    #[test]
    // Purpose
    // -------
    // Ensure request validation runs first, then draw/state compatibility.
    //
    // Given
    // -----
    // - Draws with K = 3 and a state with p = 2 (K = 5).
    //
    // Expect
    // ------
    // - horizon 0 → `InvalidHorizon`; horizon 2 → `ShapeMismatch`.
    fn forecast_validates_before_simulating() {
        let (draws, _) = sv_model(2);
        let y = array![[0.1, 0.4, -0.2], [1.0, 0.8, 0.9]];
        let state = LastInSampleState::from_data(y, None, 2, true).unwrap();
        let opts = ForecastOptions::default();
        assert_eq!(
            forecast(&draws, &state, 0, None, None, &opts).unwrap_err(),
            ForecastError::InvalidHorizon { horizon: 0 }
        );
        assert!(matches!(
            forecast(&draws, &state, 2, None, None, &opts),
            Err(ForecastError::ShapeMismatch { what: "autoregressive draws", .. })
        ));
        assert_eq!(SVARShape::new(2, 2, 0, true).unwrap().k(), 5);
    }

    #[test]
    // Purpose
    // -------
    // Verify reproducibility independent of the degree of parallelism.
    //
    // Given
    // -----
    // - SV model with S = 16, H = 4, seed 123; runs on 1 thread, 4 threads,
    //   and the global pool.
    //
    // Expect
    // ------
    // - Bit-identical bundles; a different seed changes the paths.
    fn forecast_is_reproducible_across_thread_counts() {
        // Arrange
        let (draws, state) = sv_model(16);
        let opts = |threads: Option<usize>| ForecastOptions {
            seed: Some(123),
            n_threads: threads,
            ..Default::default()
        };

        // Act
        let single = forecast(&draws, &state, 4, None, None, &opts(Some(1))).unwrap();
        let many = forecast(&draws, &state, 4, None, None, &opts(Some(4))).unwrap();
        let global = forecast(&draws, &state, 4, None, None, &opts(None)).unwrap();
        let other_seed = ForecastOptions { seed: Some(124), ..Default::default() };
        let other = forecast(&draws, &state, 4, None, None, &other_seed).unwrap();

        // Assert
        assert_eq!(single, many);
        assert_eq!(single, global);
        assert_ne!(single.forecasts, other.forecasts);
        assert!(single.heteroskedastic);
    }

    #[test]
    // Purpose
    // -------
    // Check that an unseeded call still produces a complete, finite bundle.
    //
    // Given
    // -----
    // - `seed = None`, S = 3, H = 2.
    //
    // Expect
    // ------
    // - Shapes (2, 2, 3) and (2, 2, 2, 3); all entries finite.
    fn forecast_without_seed_uses_entropy() {
        let (draws, state) = sv_model(3);
        let opts = ForecastOptions { seed: None, ..Default::default() };
        let bundle = forecast(&draws, &state, 2, None, None, &opts).unwrap();
        assert_eq!(bundle.forecasts.dim(), (2, 2, 3));
        assert_eq!(bundle.forecast_covariance.dim(), (2, 2, 2, 3));
        assert!(bundle.forecasts.iter().all(|v| v.is_finite()));
    }

    // Draw s has a singular B iff `singular(s)`.
    fn model_with_singular_draws(
        s: usize, singular: impl Fn(usize) -> bool,
    ) -> (PosteriorDraws, LastInSampleState) {
        let a = Array3::<f64>::from_elem((2, 3, s), 0.1);
        let mut b = Array3::<f64>::zeros((2, 2, s));
        for draw in (0..s).filter(|&d| !singular(d)) {
            b[[0, 0, draw]] = 1.0;
            b[[1, 1, draw]] = 1.0;
        }
        let draws = PosteriorDraws::new(a, b, Heteroskedasticity::Homoskedastic).unwrap();
        let y = array![[0.1, 0.4], [1.0, 0.8]];
        (draws, LastInSampleState::from_data(y, None, 1, true).unwrap())
    }

    #[test]
    // Purpose
    // -------
    // Verify the reported failure is the lowest failing draw regardless of
    // scheduling.
    //
    // Given
    // -----
    // - S = 64 with every draw from 5 on singular; global pool and dedicated
    //   pools of 1 and 4 threads.
    //
    // Expect
    // ------
    // - `SingularStructuralMatrix { draw: 5 }` in every run.
    fn forecast_reports_lowest_failing_draw_for_any_thread_count() {
        // Arrange
        let (draws, state) = model_with_singular_draws(64, |d| d >= 5);

        for threads in [None, Some(1), Some(4)] {
            let opts = ForecastOptions { n_threads: threads, ..Default::default() };

            // Act
            let err = forecast(&draws, &state, 2, None, None, &opts).unwrap_err();

            // Assert
            assert_eq!(err, ForecastError::SingularStructuralMatrix { draw: 5 });
        }
    }

    #[test]
    // Purpose
    // -------
    // Check that draws above an observed failure are not simulated.
    //
    // Given
    // -----
    // - S = 16 with only draw 0 singular, run on a single-thread pool so the
    //   draws execute in index order.
    //
    // Expect
    // ------
    // - Entry 0 is the error; entries 1..16 are skipped (`None`).
    fn run_draws_skips_draws_above_a_failure() {
        // Arrange
        let (draws, state) = model_with_singular_draws(16, |d| d == 0);
        let opts = ForecastOptions::default();
        let request = ForecastRequest::new(2, None, None, state.shape()).unwrap();
        let pool = ThreadPoolBuilder::new().num_threads(1).build().unwrap();

        // Act
        let results = pool.install(|| run_draws(&draws, &state, &request, &opts, 42));

        // Assert
        assert_eq!(results.len(), 16);
        assert_eq!(
            results[0],
            Some(Err(ForecastError::SingularStructuralMatrix { draw: 0 }))
        );
        assert!(results[1..].iter().all(Option::is_none));
    }

    #[test]
    // Purpose
    // -------
    // Ensure options built as struct literals are re-validated.
    //
    // Given
    // -----
    // - `constraint_tol = NaN` and, separately, `n_threads = Some(0)`.
    //
    // Expect
    // ------
    // - `InvalidOption` naming the field, before any simulation.
    fn forecast_revalidates_literal_options() {
        let (draws, state) = sv_model(2);
        let nan_tol = ForecastOptions { constraint_tol: f64::NAN, ..Default::default() };
        let no_threads = ForecastOptions { n_threads: Some(0), ..Default::default() };
        assert!(matches!(
            forecast(&draws, &state, 2, None, None, &nan_tol),
            Err(ForecastError::InvalidOption { what: "constraint_tol", .. })
        ));
        assert!(matches!(
            forecast(&draws, &state, 2, None, None, &no_threads),
            Err(ForecastError::InvalidOption { what: "n_threads", .. })
        ));
    }
}
