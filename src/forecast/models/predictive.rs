//! Predictive path simulation — one posterior draw of the joint predictive
//! density of `y_{T+1}, …, y_{T+H}`.
//!
//! Purpose
//! -------
//! Propagate the reduced-form recursion `y_h = A_s x_h + B_s⁻¹ u_h` forward
//! from the last in-sample state for a single posterior draw, using that draw's
//! forecast variances for the structural shocks and honoring any hard
//! conditional-forecast constraints.
//!
//! Key behaviors
//! -------------
//! - Invert `B_s` once per draw with a conditioning check.
//! - Forecast the draw's variance path, then draw shocks step by step.
//! - For constrained steps, condition the shocks exactly on the pinned values
//!   and pin those coordinates of `y_h` to their requested values.
//! - Record the reduced-form covariance `Σ_h = B_s⁻¹ diag(σ²_h) B_s⁻ᵀ`.
//! - Feed each simulated `y_h` back into the lag structure of `x_{h+1}`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs were validated (request, draws, state, and their mutual
//!   dimensions) before this function is called.
//! - Generator consumption order is fixed: the volatility path first, then
//!   `N` standard normals per step for `h = 1..H`. Conditioning consumes no
//!   randomness, so constrained and free runs share the same shock stream.
//!
//! Conventions
//! -----------
//! - `path[[n, h]]` is variable `n` at step `T + h + 1`;
//!   `covariance[[i, j, h]]` is the matching reduced-form covariance.
//!
//! Downstream usage
//! ----------------
//! - Called once per draw by `models::forecast`, possibly from several worker
//!   threads at once; the function holds no shared mutable state.
//!
//! Testing notes
//! -------------
//! - Unit tests replay the generator to check the recursion step by step,
//!   verify covariances under regime-switching variances, check exact
//!   constraint satisfaction and its propagation through the lags, and cover
//!   the singular-`B` failure.
use crate::forecast::{
    core::{
        conditioning::ForecastRequest,
        draws::PosteriorDraws,
        linalg::invert_structural,
        options::ForecastOptions,
        shocks::{ShockConstraint, condition_shocks, draw_shocks},
        state::{LastInSampleState, advance_regressor},
    },
    errors::ForecastResult,
};
use ndarray::{Array1, Array2, Array3, Axis};
use rand::Rng;

/// DrawForecast — simulated output of one posterior draw.
///
/// Fields
/// ------
/// - `path`: `Array2<f64>` (N × H) simulated values.
/// - `sigma`: `Array2<f64>` (N × H) structural shock variances used.
/// - `covariance`: `Array3<f64>` (N × N × H) reduced-form covariances.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawForecast {
    pub path: Array2<f64>,
    pub sigma: Array2<f64>,
    pub covariance: Array3<f64>,
}

/// simulate_draw — forecast path and covariances of posterior draw `s`.
///
/// Parameters
/// ----------
/// - `draws`: `&PosteriorDraws`
///   Posterior sample; slice `s` is used.
/// - `state`: `&LastInSampleState`
///   Last regressor `x_T` and history (supplies `y_T`).
/// - `request`: `&ForecastRequest`
///   Horizon, exogenous forecast, and constraints.
/// - `options`: `&ForecastOptions`
///   Tolerances for the inversion and the constraint check.
/// - `s`: `usize`
///   Draw index.
/// - `rng`: `&mut R`
///   The draw's own generator.
///
/// Returns
/// -------
/// `ForecastResult<DrawForecast>`
///
/// Errors
/// ------
/// - `ForecastError::SingularStructuralMatrix` if `B_s` is numerically
///   singular.
/// - `ForecastError::NonFiniteVolatility` from the volatility forecaster.
/// - `ForecastError::InfeasibleConstraint` if a step's constraints contradict
///   each other under this draw.
pub fn simulate_draw<R: Rng + ?Sized>(
    draws: &PosteriorDraws, state: &LastInSampleState, request: &ForecastRequest,
    options: &ForecastOptions, s: usize, rng: &mut R,
) -> ForecastResult<DrawForecast> {
    let shape = state.shape();
    let (n, horizon) = (shape.n, request.horizon());
    let a = draws.a(s);
    let b_inv = invert_structural(draws.b(s), s, options.singular_tol)?;
    let sigma = draws.heteroskedasticity().forecast_volatility(s, n, horizon, rng)?;

    let mut path = Array2::<f64>::zeros((n, horizon));
    let mut covariance = Array3::<f64>::zeros((n, n, horizon));
    let mut x = state.x_last().to_owned();
    let mut newest: Array1<f64> = state.y_last().to_owned();

    for h in 0..horizon {
        advance_regressor(&mut x, newest.view(), request.exogenous_row(h), shape);
        let mean = a.dot(&x);
        let variances = sigma.column(h);
        let mut shocks = draw_shocks(variances, rng);

        let constraints = request.constrained(h);
        if !constraints.is_empty() {
            let system = ShockConstraint {
                b_inv: b_inv.view(),
                variances,
                mean: mean.view(),
                constraints: &constraints,
            };
            shocks = condition_shocks(&shocks, &system, options.constraint_tol, s, h)?;
        }

        let mut y = &mean + &b_inv.dot(&shocks);
        for &(var, value) in &constraints {
            y[var] = value;
        }

        let scaled = &b_inv * &variances;
        covariance.index_axis_mut(Axis(2), h).assign(&scaled.dot(&b_inv.t()));
        path.column_mut(h).assign(&y);
        newest = y;
    }

    Ok(DrawForecast { path, sigma, covariance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{
        core::{params::RegimeDraws, shape::SVARShape, volatility::Heteroskedasticity},
        errors::ForecastError,
    };
    use approx::assert_relative_eq;
    use ndarray::{Array3, array};
    use rand::{SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The recursion y_h = A x_h + B⁻¹ u_h with lag feedback, checked by
    //   replaying the generator.
    // - Covariance recording under time-varying (MSH) variances.
    // - Exact constraint satisfaction and propagation into later steps.
    // - Singular B reporting.
    //
    // They intentionally DO NOT cover:
    // - Parallel scheduling and seeding (`models::forecast`).
    // -------------------------------------------------------------------------

    // N = 2, p = 1, intercept; A = [Φ | c], B lower-triangular.
    fn setup(het: Heteroskedasticity, s: usize) -> (PosteriorDraws, LastInSampleState) {
        let mut a = Array3::<f64>::zeros((2, 3, s));
        let mut b = Array3::<f64>::zeros((2, 2, s));
        for draw in 0..s {
            a.index_axis_mut(Axis(2), draw)
                .assign(&array![[0.5, 0.1, 1.0], [0.2, 0.3, -1.0]]);
            b.index_axis_mut(Axis(2), draw).assign(&array![[2.0, 0.0], [1.0, 1.0]]);
        }
        let draws = PosteriorDraws::new(a, b, het).unwrap();
        let shape = SVARShape::new(2, 1, 0, true).unwrap();
        let state =
            LastInSampleState::new(array![0.0, 0.0, 1.0], array![[0.5, 1.0], [2.0, -1.0]], shape)
                .unwrap();
        (draws, state)
    }

    #[test]
    // Purpose
    // -------
    // Verify the homoskedastic recursion step by step.
    //
    // Given
    // -----
    // - y_T = (1, −1); B⁻¹ = [[0.5, 0], [−0.5, 1]]; H = 3; seed 9.
    //
    // Expect
    // ------
    // - Replaying N(0, 1) shocks from the same seed reproduces every column,
    //   each using the previous simulated column as its lag.
    fn simulate_draw_follows_var_recursion() {
        // Arrange
        let (draws, state) = setup(Heteroskedasticity::Homoskedastic, 1);
        let request = ForecastRequest::new(3, None, None, state.shape()).unwrap();
        let opts = ForecastOptions::default();
        let a = array![[0.5, 0.1, 1.0], [0.2, 0.3, -1.0]];
        let b_inv = array![[0.5, 0.0], [-0.5, 1.0]];

        // Act
        let out = simulate_draw(&draws, &state, &request, &opts, 0, &mut StdRng::seed_from_u64(9))
            .unwrap();

        // Assert
        let mut replay = StdRng::seed_from_u64(9);
        let mut prev = array![1.0, -1.0];
        for h in 0..3 {
            let x = array![prev[0], prev[1], 1.0];
            let u = draw_shocks(array![1.0, 1.0].view(), &mut replay);
            let expected = a.dot(&x) + b_inv.dot(&u);
            for i in 0..2 {
                assert_relative_eq!(out.path[[i, h]], expected[i], epsilon = 1e-12);
            }
            prev = expected;
        }
        assert!(out.sigma.iter().all(|&v| v == 1.0));
    }

    #[test]
    // Purpose
    // -------
    // Check that recorded covariances equal B⁻¹ diag(σ²_h) B⁻ᵀ.
    //
    // Given
    // -----
    // - MSH with regime variances (1, 4) per variable, P = I, terminal
    //   distribution (0.5, 0.5): σ²_h = (2.5, 2.5) for all h.
    //
    // Expect
    // ------
    // - Σ_h = 2.5 · B⁻¹ B⁻ᵀ = 2.5 · [[0.25, −0.25], [−0.25, 1.25]].
    fn simulate_draw_records_reduced_form_covariance() {
        let variances = Array3::from_shape_vec((2, 2, 1), vec![1.0, 4.0, 1.0, 4.0]).unwrap();
        let transition = Array3::from_shape_vec((2, 2, 1), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let regimes = RegimeDraws::new(variances, transition, array![[0.5], [0.5]]).unwrap();
        let (draws, state) = setup(Heteroskedasticity::MarkovSwitching(regimes), 1);
        let request = ForecastRequest::new(2, None, None, state.shape()).unwrap();
        let out = simulate_draw(
            &draws,
            &state,
            &request,
            &ForecastOptions::default(),
            0,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();

        let expected = array![[0.25, -0.25], [-0.25, 1.25]] * 2.5;
        for h in 0..2 {
            for ((i, j), &want) in expected.indexed_iter() {
                assert_relative_eq!(out.covariance[[i, j, h]], want, epsilon = 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure constrained coordinates are hit exactly, free coordinates follow
    // the conditioned shocks, and pinned values feed the next step's lags.
    //
    // Given
    // -----
    // - Conditional forecast [[5, NaN], [NaN, −2]], H = 2, D = I,
    //   B⁻¹ = [[0.5, 0], [−0.5, 1]], y_T = (1, −1) so μ_1 = (1.4, −1.1).
    //
    // Expect
    // ------
    // - Step 1: y_0 = 5, u*_0 = (5 − 1.4) / 0.5 = 7.2 and u*_1 = u_1, so
    //   y_1 = −1.1 − 0.5·7.2 + u_1.
    // - Step 2: y_1 = −2 and y_0 = μ_0 + 0.5·u*_0 with
    //   u*_0 = u_0 − 0.5·(r − C u) / 1.25, where μ uses the step-1 values.
    fn simulate_draw_pins_constrained_coordinates() {
        // Arrange
        let (draws, state) = setup(Heteroskedasticity::Homoskedastic, 1);
        let cond = array![[5.0, f64::NAN], [f64::NAN, -2.0]];
        let request = ForecastRequest::new(2, None, Some(cond), state.shape()).unwrap();

        // Act
        let out = simulate_draw(
            &draws,
            &state,
            &request,
            &ForecastOptions::default(),
            0,
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();

        // Assert
        let mut replay = StdRng::seed_from_u64(3);
        let u1 = draw_shocks(array![1.0, 1.0].view(), &mut replay);
        let u2 = draw_shocks(array![1.0, 1.0].view(), &mut replay);

        assert_eq!(out.path[[0, 0]], 5.0);
        assert_relative_eq!(out.path[[1, 0]], -1.1 - 0.5 * 7.2 + u1[1], epsilon = 1e-10);

        let y11 = out.path[[1, 0]];
        let mu = array![0.5 * 5.0 + 0.1 * y11 + 1.0, 0.2 * 5.0 + 0.3 * y11 - 1.0];
        let gap = (-2.0 - mu[1]) - (-0.5 * u2[0] + u2[1]);
        let u_star0 = u2[0] - 0.5 * gap / 1.25;
        assert_eq!(out.path[[1, 1]], -2.0);
        assert_relative_eq!(out.path[[0, 1]], mu[0] + 0.5 * u_star0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a singular structural matrix aborts the draw.
    //
    // Given
    // -----
    // - B = [[1, 2], [2, 4]] in draw 0.
    //
    // Expect
    // ------
    // - `SingularStructuralMatrix { draw: 0 }`.
    fn simulate_draw_rejects_singular_b() {
        let a = Array3::<f64>::zeros((2, 3, 1));
        let b = Array3::from_shape_vec((2, 2, 1), vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        let draws = PosteriorDraws::new(a, b, Heteroskedasticity::Homoskedastic).unwrap();
        let shape = SVARShape::new(2, 1, 0, true).unwrap();
        let state = LastInSampleState::new(array![0.0, 0.0, 1.0], array![[0.0], [0.0]], shape)
            .unwrap();
        let request = ForecastRequest::new(1, None, None, &shape).unwrap();
        assert_eq!(
            simulate_draw(
                &draws,
                &state,
                &request,
                &ForecastOptions::default(),
                0,
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap_err(),
            ForecastError::SingularStructuralMatrix { draw: 0 }
        );
    }
}
