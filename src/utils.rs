//! utils — Python-side argument extraction for the forecast binding.
//!
//! Converts loosely typed Python inputs (numpy arrays, pandas objects, nested
//! sequences) into owned `ndarray` containers and assembles the
//! [`Heteroskedasticity`] variant selected by name. Everything here is glue;
//! validation of values happens in the `forecast::core` constructors.
#[cfg(feature = "python-bindings")]
use ndarray::{Array, Array1, Array2, Array3, Dimension};

#[cfg(feature = "python-bindings")]
use numpy::{PyArrayMethods, PyReadonlyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::forecast::core::{
    params::{RegimeDraws, SVDraws, SVParameterization, StudentTDraws},
    volatility::Heteroskedasticity,
};

/// Extract a float64 array of fixed dimensionality as an owned `ndarray`.
///
/// Tries, in order: a numpy array of the right rank, an object exposing
/// `to_numpy()` (pandas), and finally `numpy.asarray(obj, dtype="float64")`
/// for plain nested sequences.
///
/// # Errors
/// - `TypeError` naming `what` if none of the conversions yields a float64
///   array of rank `D`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py, D: Dimension>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Array<f64, D>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray<f64, D>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(frame_ro) = obj.extract::<PyReadonlyArray<f64, D>>() {
            return Ok(frame_ro.as_array().to_owned());
        }
    }

    let kwargs = PyDict::new(py);
    kwargs.set_item("dtype", "float64")?;
    let converted = py.import("numpy")?.call_method("asarray", (raw_data,), Some(&kwargs));
    converted
        .ok()
        .and_then(|arr| arr.extract::<PyReadonlyArray<f64, D>>().ok())
        .map(|arr_ro| arr_ro.as_array().to_owned())
        .ok_or_else(|| {
            PyTypeError::new_err(format!(
                "{what} must be a float64 array-like with {} dimension(s)",
                D::NDIM.map_or_else(|| "a fixed number of".to_string(), |n| n.to_string())
            ))
        })
}

/// Extract an optional array argument; `None` and Python `None` both map to
/// `Ok(None)`.
#[cfg(feature = "python-bindings")]
pub fn extract_optional_array<'py, D: Dimension>(
    py: Python<'py>, raw_data: Option<&Bound<'py, PyAny>>, what: &str,
) -> PyResult<Option<Array<f64, D>>> {
    match raw_data {
        Some(obj) if !obj.is_none() => extract_f64_array(py, obj, what).map(Some),
        _ => Ok(None),
    }
}

#[cfg(feature = "python-bindings")]
fn require_array<'py, D: Dimension>(
    py: Python<'py>, raw_data: Option<&Bound<'py, PyAny>>, what: &str, variant: &str,
) -> PyResult<Array<f64, D>> {
    extract_optional_array(py, raw_data, what)?.ok_or_else(|| {
        PyValueError::new_err(format!("{what} must be provided when variant='{variant}'"))
    })
}

/// Python-side arrays describing the structural variance process.
///
/// Only the arrays required by the chosen variant are read:
///
/// | variant                       | required arrays                                     |
/// |-------------------------------|-----------------------------------------------------|
/// | `homoskedastic`               | none                                                |
/// | `msh`                         | `regime_variances`, `transition`, `terminal_regime` |
/// | `mixture`                     | `regime_variances`, `mixture_probabilities`         |
/// | `sv` / `sv_centred`           | `sv_persistence`, `sv_scale`, `sv_terminal`         |
/// | `student_t`                   | `degrees_of_freedom`                                |
#[cfg(feature = "python-bindings")]
#[derive(Default)]
pub struct VarianceArgs<'a, 'py> {
    pub regime_variances: Option<&'a Bound<'py, PyAny>>,
    pub transition: Option<&'a Bound<'py, PyAny>>,
    pub terminal_regime: Option<&'a Bound<'py, PyAny>>,
    pub mixture_probabilities: Option<&'a Bound<'py, PyAny>>,
    pub sv_persistence: Option<&'a Bound<'py, PyAny>>,
    pub sv_scale: Option<&'a Bound<'py, PyAny>>,
    pub sv_terminal: Option<&'a Bound<'py, PyAny>>,
    pub degrees_of_freedom: Option<&'a Bound<'py, PyAny>>,
}

/// Build the [`Heteroskedasticity`] variant named by `variant`.
///
/// # Errors
/// - `ValueError` for an unknown variant name or a missing required array.
/// - `TypeError` for arrays of the wrong rank.
/// - `ValueError` carrying the domain message when a constructor rejects the
///   values (shapes, probabilities, positivity).
#[cfg(feature = "python-bindings")]
pub fn build_heteroskedasticity<'py>(
    py: Python<'py>, variant: &str, args: &VarianceArgs<'_, 'py>,
) -> PyResult<Heteroskedasticity> {
    let variant_str = variant.to_lowercase();
    let model = match variant_str.as_str() {
        "homoskedastic" | "none" => Heteroskedasticity::Homoskedastic,
        "msh" | "markov_switching" => {
            let variances: Array3<f64> =
                require_array(py, args.regime_variances, "regime_variances", &variant_str)?;
            let transition: Array3<f64> =
                require_array(py, args.transition, "transition", &variant_str)?;
            let terminal: Array2<f64> =
                require_array(py, args.terminal_regime, "terminal_regime", &variant_str)?;
            Heteroskedasticity::MarkovSwitching(RegimeDraws::new(variances, transition, terminal)?)
        }
        "mixture" | "sparse_mixture" => {
            let variances: Array3<f64> =
                require_array(py, args.regime_variances, "regime_variances", &variant_str)?;
            let probabilities: Array2<f64> = require_array(
                py,
                args.mixture_probabilities,
                "mixture_probabilities",
                &variant_str,
            )?;
            Heteroskedasticity::Mixture(RegimeDraws::from_mixture(variances, probabilities)?)
        }
        "sv" | "sv_centred" => {
            let parameterization = if variant_str == "sv" {
                SVParameterization::NonCentred
            } else {
                SVParameterization::Centred
            };
            let persistence: Array2<f64> =
                require_array(py, args.sv_persistence, "sv_persistence", &variant_str)?;
            let scale: Array2<f64> = require_array(py, args.sv_scale, "sv_scale", &variant_str)?;
            let terminal: Array2<f64> =
                require_array(py, args.sv_terminal, "sv_terminal", &variant_str)?;
            Heteroskedasticity::StochasticVolatility(SVDraws::new(
                persistence,
                scale,
                terminal,
                parameterization,
            )?)
        }
        "student_t" | "t" => {
            let nu: Array1<f64> =
                require_array(py, args.degrees_of_freedom, "degrees_of_freedom", &variant_str)?;
            Heteroskedasticity::StudentT(StudentTDraws::new(nu)?)
        }
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid variant {:?} (expected 'homoskedastic', 'msh', 'mixture', 'sv', 'sv_centred', or 'student_t')",
                other
            )));
        }
    };
    Ok(model)
}
