//! Result aggregation — assemble per-draw outputs into the forecast bundle.
//!
//! Purpose
//! -------
//! Stack per-draw simulated paths, variance paths and covariance sequences
//! into draw-indexed arrays and attach the historical data, without
//! transforming any value.
//!
//! Key behaviors
//! -------------
//! - Draw `s` of the input always lands in slice `s` of every output array.
//! - If any draw failed, the error of the lowest failing draw index is
//!   returned and no partial bundle is produced.
//!
//! Conventions
//! -----------
//! - `forecasts[[n, h, s]]`, `forecasts_sigma[[n, h, s]]`,
//!   `forecast_covariance[[i, j, h, s]]`.
//! - `forecasts_sigma` is populated for every variant; for homoskedastic
//!   models it is identically one and `heteroskedastic` is `false`.
use crate::forecast::{
    core::validation::validate_shape, errors::ForecastResult, models::predictive::DrawForecast,
};
use ndarray::{Array2, Array3, Array4, ArrayView2, Axis};

/// ForecastBundle — posterior predictive sample of an SVAR.
///
/// Fields
/// ------
/// - `forecasts`: `Array3<f64>` (N × H × S) simulated paths.
/// - `forecasts_sigma`: `Array3<f64>` (N × H × S) structural shock variances.
/// - `forecast_covariance`: `Array4<f64>` (N × N × H × S) reduced-form
///   covariances.
/// - `y`: `Array2<f64>` (N × T) historical data, unchanged.
/// - `heteroskedastic`: whether `forecasts_sigma` varies across time/draws by
///   model construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBundle {
    pub forecasts: Array3<f64>,
    pub forecasts_sigma: Array3<f64>,
    pub forecast_covariance: Array4<f64>,
    pub y: Array2<f64>,
    pub heteroskedastic: bool,
}

impl ForecastBundle {
    /// Assemble a bundle from per-draw results given in draw order.
    ///
    /// Parameters
    /// ----------
    /// - `results`: `Vec<ForecastResult<DrawForecast>>`
    ///   One entry per posterior draw, index = draw.
    /// - `n`, `horizon`: output dimensions N and H.
    /// - `y`: historical data to attach.
    /// - `heteroskedastic`: variant flag copied into the bundle.
    ///
    /// Errors
    /// ------
    /// - The first (lowest draw index) error in `results`.
    /// - `ForecastError::ShapeMismatch` if a draw's arrays do not match
    ///   `(N, H)` / `(N, N, H)`.
    pub fn from_draws(
        results: Vec<ForecastResult<DrawForecast>>, n: usize, horizon: usize, y: ArrayView2<f64>,
        heteroskedastic: bool,
    ) -> ForecastResult<ForecastBundle> {
        let draws = results.into_iter().collect::<ForecastResult<Vec<DrawForecast>>>()?;
        let s_total = draws.len();
        let mut forecasts = Array3::<f64>::zeros((n, horizon, s_total));
        let mut forecasts_sigma = Array3::<f64>::zeros((n, horizon, s_total));
        let mut forecast_covariance = Array4::<f64>::zeros((n, n, horizon, s_total));

        for (s, draw) in draws.iter().enumerate() {
            validate_shape("simulated path", draw.path.shape(), &[n, horizon])?;
            validate_shape("volatility path", draw.sigma.shape(), &[n, horizon])?;
            validate_shape("forecast covariance", draw.covariance.shape(), &[n, n, horizon])?;
            forecasts.index_axis_mut(Axis(2), s).assign(&draw.path);
            forecasts_sigma.index_axis_mut(Axis(2), s).assign(&draw.sigma);
            forecast_covariance.index_axis_mut(Axis(3), s).assign(&draw.covariance);
        }

        Ok(ForecastBundle {
            forecasts,
            forecasts_sigma,
            forecast_covariance,
            y: y.to_owned(),
            heteroskedastic,
        })
    }

    /// Number of posterior draws S.
    pub fn n_draws(&self) -> usize {
        self.forecasts.dim().2
    }

    /// Forecast horizon H.
    pub fn horizon(&self) -> usize {
        self.forecasts.dim().1
    }

    /// Posterior predictive mean per variable and horizon (N × H).
    pub fn mean_forecast(&self) -> Option<Array2<f64>> {
        self.forecasts.mean_axis(Axis(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::errors::ForecastError;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Draw-order preserving assembly.
    // - Propagation of the lowest-index draw error.
    // -------------------------------------------------------------------------

    fn draw(value: f64) -> DrawForecast {
        DrawForecast {
            path: Array2::from_elem((2, 1), value),
            sigma: Array2::ones((2, 1)),
            covariance: Array3::from_elem((2, 2, 1), value),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that slice s of every output holds draw s.
    //
    // Given
    // -----
    // - Three draws with constant paths 0, 1, 2; N = 2, H = 1.
    //
    // Expect
    // ------
    // - forecasts[.., .., s] == s and the covariance likewise; mean 1.
    fn from_draws_preserves_draw_order() {
        let y = array![[1.0, 2.0], [3.0, 4.0]];
        let results = (0..3).map(|s| Ok(draw(s as f64))).collect();
        let bundle = ForecastBundle::from_draws(results, 2, 1, y.view(), false).unwrap();
        assert_eq!(bundle.forecasts.dim(), (2, 1, 3));
        assert_eq!(bundle.forecast_covariance.dim(), (2, 2, 1, 3));
        for s in 0..3 {
            assert_eq!(bundle.forecasts[[1, 0, s]], s as f64);
            assert_eq!(bundle.forecast_covariance[[0, 1, 0, s]], s as f64);
        }
        assert_eq!(bundle.y, y);
        assert_eq!(bundle.mean_forecast().unwrap()[[0, 0]], 1.0);
        assert_eq!((bundle.n_draws(), bundle.horizon()), (3, 1));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the lowest-index failure wins and no bundle is returned.
    //
    // Given
    // -----
    // - Draw 1 singular and draw 2 infeasible.
    //
    // Expect
    // ------
    // - `SingularStructuralMatrix { draw: 1 }`.
    fn from_draws_propagates_first_failure() {
        let results = vec![
            Ok(draw(0.0)),
            Err(ForecastError::SingularStructuralMatrix { draw: 1 }),
            Err(ForecastError::InfeasibleConstraint { draw: 2, horizon: 0, residual: 1.0 }),
        ];
        let err = ForecastBundle::from_draws(results, 2, 1, Array2::zeros((2, 1)).view(), true)
            .unwrap_err();
        assert_eq!(err, ForecastError::SingularStructuralMatrix { draw: 1 });
    }
}
