//! svar_forecast — posterior predictive forecasting for structural VARs with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the forecasting engine to Python via the `_svar_forecast` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing `forecast_svar` function and the module initializer.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust module (`forecast`) as the public crate surface.
//! - Convert numpy inputs into validated [`PosteriorDraws`],
//!   [`LastInSampleState`] and [`ForecastOptions`], run [`forecast`] with the
//!   GIL released, and return the bundle as a dict of numpy arrays.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in [`forecast`]; this file performs only FFI
//!   glue, argument defaulting, and error mapping.
//! - Array layouts on the Python side match the Rust conventions: posterior
//!   draws on the last axis, variables first.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code surface as `ValueError` (domain failures) or
//!   `TypeError` (arguments that are not float64 array-likes).
//! - Missing entries of `conditional_forecast` are `NaN`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`forecast`] directly and can ignore the
//!   items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_svar_forecast` and wraps
//!   `forecast_svar` in a user-facing API.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules and
//!   by `tests/integration_forecast_pipeline.rs`.
//!
//! [`PosteriorDraws`]: crate::forecast::PosteriorDraws
//! [`LastInSampleState`]: crate::forecast::LastInSampleState
//! [`ForecastOptions`]: crate::forecast::ForecastOptions

pub mod forecast;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Array3};

#[cfg(feature = "python-bindings")]
use numpy::IntoPyArray;

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    forecast::{
        core::{
            draws::PosteriorDraws, options::ForecastOptions, shape::SVARShape,
            state::LastInSampleState,
        },
        models::forecast::forecast,
    },
    utils::{VarianceArgs, build_heteroskedasticity, extract_f64_array, extract_optional_array},
};

/// forecast_svar — sample the posterior predictive density from Python.
///
/// Parameters
/// ----------
/// - `a`: `(N, K, S)` autoregressive draws.
/// - `b`: `(N, N, S)` structural-matrix draws.
/// - `y`: `(N, T)` in-sample data.
/// - `p`: lag order.
/// - `horizon`: number of forecast steps H.
/// - `constant`: whether `x_t` carries an intercept (default `True`).
/// - `exogenous`: optional `(T, d)` in-sample exogenous data; used to build
///   `x_T` together with `y`.
/// - `x_last`: optional explicit `(K,)` regressor `x_T`; overrides the one
///   built from `y`.
/// - `exogenous_forecast`: `(H, d)` future exogenous values, required iff
///   `d > 0`.
/// - `conditional_forecast`: `(H, N)` pinned values, `NaN` = free.
/// - `variant`: `'homoskedastic'`, `'msh'`, `'mixture'`, `'sv'`,
///   `'sv_centred'`, or `'student_t'`, with the matching variance arrays.
/// - `seed`, `n_threads`, `verbose`, `constraint_tol`, `singular_tol`:
///   run-time options.
///
/// Returns
/// -------
/// `dict` with `forecasts` (N, H, S), `forecasts_sigma` (N, H, S),
/// `forecast_covariance` (N, N, H, S), `y` (N, T) and the bool
/// `heteroskedastic`.
///
/// Errors
/// ------
/// - `ValueError` for any validation or per-draw failure.
/// - `TypeError` for arguments that cannot be read as float64 arrays.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        a, b, y, p, horizon, constant = true, exogenous = None, x_last = None,
        exogenous_forecast = None, conditional_forecast = None, variant = "homoskedastic",
        regime_variances = None, transition = None, terminal_regime = None,
        mixture_probabilities = None, sv_persistence = None, sv_scale = None,
        sv_terminal = None, degrees_of_freedom = None, seed = Some(42), n_threads = None,
        verbose = false, constraint_tol = 1e-8, singular_tol = 1e-12
    ),
    text_signature = "(a, b, y, p, horizon, constant=True, exogenous=None, x_last=None, \
                      exogenous_forecast=None, conditional_forecast=None, \
                      variant='homoskedastic', regime_variances=None, transition=None, \
                      terminal_regime=None, mixture_probabilities=None, sv_persistence=None, \
                      sv_scale=None, sv_terminal=None, degrees_of_freedom=None, seed=42, \
                      n_threads=None, verbose=False, constraint_tol=1e-8, singular_tol=1e-12)"
)]
#[allow(clippy::too_many_arguments)]
fn forecast_svar<'py>(
    py: Python<'py>, a: &Bound<'py, PyAny>, b: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>,
    p: usize, horizon: usize, constant: bool, exogenous: Option<&Bound<'py, PyAny>>,
    x_last: Option<&Bound<'py, PyAny>>, exogenous_forecast: Option<&Bound<'py, PyAny>>,
    conditional_forecast: Option<&Bound<'py, PyAny>>, variant: &str,
    regime_variances: Option<&Bound<'py, PyAny>>, transition: Option<&Bound<'py, PyAny>>,
    terminal_regime: Option<&Bound<'py, PyAny>>,
    mixture_probabilities: Option<&Bound<'py, PyAny>>,
    sv_persistence: Option<&Bound<'py, PyAny>>, sv_scale: Option<&Bound<'py, PyAny>>,
    sv_terminal: Option<&Bound<'py, PyAny>>, degrees_of_freedom: Option<&Bound<'py, PyAny>>,
    seed: Option<u64>, n_threads: Option<usize>, verbose: bool, constraint_tol: f64,
    singular_tol: f64,
) -> PyResult<Bound<'py, PyDict>> {
    let a_arr: Array3<f64> = extract_f64_array(py, a, "a")?;
    let b_arr: Array3<f64> = extract_f64_array(py, b, "b")?;
    let y_arr: Array2<f64> = extract_f64_array(py, y, "y")?;
    let exog_arr: Option<Array2<f64>> = extract_optional_array(py, exogenous, "exogenous")?;
    let x_last_arr: Option<Array1<f64>> = extract_optional_array(py, x_last, "x_last")?;
    let exog_fc: Option<Array2<f64>> =
        extract_optional_array(py, exogenous_forecast, "exogenous_forecast")?;
    let cond_fc: Option<Array2<f64>> =
        extract_optional_array(py, conditional_forecast, "conditional_forecast")?;

    let args = VarianceArgs {
        regime_variances,
        transition,
        terminal_regime,
        mixture_probabilities,
        sv_persistence,
        sv_scale,
        sv_terminal,
        degrees_of_freedom,
    };
    let heteroskedasticity = build_heteroskedasticity(py, variant, &args)?;
    let draws = PosteriorDraws::new(a_arr, b_arr, heteroskedasticity)?;

    let state = match x_last_arr {
        Some(x) => {
            let d = exog_arr
                .as_ref()
                .or(exog_fc.as_ref())
                .map_or(0, |z| z.ncols());
            let shape = SVARShape::new(y_arr.nrows(), p, d, constant)?;
            LastInSampleState::new(x, y_arr, shape)?
        }
        None => LastInSampleState::from_data(y_arr, exog_arr, p, constant)?,
    };
    let options = ForecastOptions::new(seed, n_threads, verbose, constraint_tol, singular_tol)?;

    let bundle =
        py.allow_threads(|| forecast(&draws, &state, horizon, exog_fc, cond_fc, &options))?;

    let out = PyDict::new(py);
    out.set_item("forecasts", bundle.forecasts.into_pyarray(py))?;
    out.set_item("forecasts_sigma", bundle.forecasts_sigma.into_pyarray(py))?;
    out.set_item("forecast_covariance", bundle.forecast_covariance.into_pyarray(py))?;
    out.set_item("y", bundle.y.into_pyarray(py))?;
    out.set_item("heteroskedastic", bundle.heteroskedastic)?;
    Ok(out)
}

/// _svar_forecast — PyO3 module initializer for the Python extension.
///
/// Registers `forecast_svar` on the `_svar_forecast` module. Invoked by
/// Python when the compiled extension is imported.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _svar_forecast<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(forecast_svar, m)?)?;
    Ok(())
}
