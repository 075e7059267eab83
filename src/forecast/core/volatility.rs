//! Volatility path forecasting — future conditional variances of the structural
//! shocks, one algorithm per heteroskedasticity variant.
//!
//! Purpose
//! -------
//! Produce, for a single posterior draw, the `N × H` block of forecast
//! conditional variances that scales the structural shocks of the predictive
//! path simulator. Variants are a closed sum type, [`Heteroskedasticity`],
//! dispatching to structurally different recursions.
//!
//! Key behaviors
//! -------------
//! - Homoskedastic: every variance equals one (scale absorbed in `B`).
//! - Markov-switching / mixture: propagate the terminal regime distribution
//!   through the draw's transition matrix and report the regime-probability
//!   weighted mixture of regime variances. Closed form, consumes no
//!   randomness.
//! - Stochastic volatility: simulate the AR(1) log-volatility forward from the
//!   terminal smoothed state under the estimation-time parameterization.
//! - Student-t: draw one inverse-χ² mixing scale per horizon and broadcast it
//!   across all variables.
//!
//! Invariants & assumptions
//! ------------------------
//! - Variant parameters were validated at construction (`core::params`).
//! - Random numbers are drawn from the caller's per-draw generator in a fixed
//!   order (horizon outer, variable inner) so that results do not depend on
//!   how draws are scheduled across threads.
//! - Every returned variance is finite and strictly positive; otherwise the
//!   draw fails with [`ForecastError::NonFiniteVolatility`].
//!
//! Conventions
//! -----------
//! - Output column `h` holds the variance of forecast step `h + 1`.
//! - SV recursion: `h_t = g·h_{t−1} + v_t`; non-centred variance
//!   `exp(ω·h_t)` with `v_t ~ N(0, 1)`, centred variance `exp(h_t)` with
//!   `v_t ~ N(0, σ²_v)`.
//! - Student-t mixing scale: `λ = ν / χ²_ν`, so that `u = √λ·ε` with
//!   `ε ~ N(0, 1)` is t-distributed with ν degrees of freedom.
//!
//! Performance
//! -----------
//! - Regime variants: O(H·M²) per draw. SV: O(H·N). Student-t: O(H).
//!
//! Testing notes
//! -------------
//! - Unit tests check the all-ones homoskedastic block, the closed-form
//!   one-step regime mixture, Monte Carlo moments of the SV and Student-t
//!   paths, and reproducibility for a fixed generator seed.
use crate::forecast::{
    core::params::{RegimeDraws, SVDraws, SVParameterization, StudentTDraws},
    errors::{ForecastError, ForecastResult},
};
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, StandardNormal};

/// Heteroskedasticity — closed set of structural-variance processes.
#[derive(Debug, Clone, PartialEq)]
pub enum Heteroskedasticity {
    /// Constant unit variances.
    Homoskedastic,
    /// Markov-switching heteroskedasticity.
    MarkovSwitching(RegimeDraws),
    /// Finite or sparse mixture of normals.
    Mixture(RegimeDraws),
    /// Stochastic volatility.
    StochasticVolatility(SVDraws),
    /// Student-t scale mixture.
    StudentT(StudentTDraws),
}

impl Heteroskedasticity {
    /// Short variant name used in logs and bindings.
    pub fn name(&self) -> &'static str {
        match self {
            Heteroskedasticity::Homoskedastic => "homoskedastic",
            Heteroskedasticity::MarkovSwitching(_) => "msh",
            Heteroskedasticity::Mixture(_) => "mixture",
            Heteroskedasticity::StochasticVolatility(_) => "sv",
            Heteroskedasticity::StudentT(_) => "t",
        }
    }

    /// Whether the variant produces time-varying variances.
    pub fn is_heteroskedastic(&self) -> bool {
        !matches!(self, Heteroskedasticity::Homoskedastic)
    }

    /// Number of posterior draws carried by the variant, if any.
    pub fn n_draws(&self) -> Option<usize> {
        match self {
            Heteroskedasticity::Homoskedastic => None,
            Heteroskedasticity::MarkovSwitching(r) | Heteroskedasticity::Mixture(r) => {
                Some(r.n_draws())
            }
            Heteroskedasticity::StochasticVolatility(sv) => Some(sv.n_draws()),
            Heteroskedasticity::StudentT(t) => Some(t.n_draws()),
        }
    }

    /// Number of variables the variant parameters refer to, if per-variable.
    pub fn n_variables(&self) -> Option<usize> {
        match self {
            Heteroskedasticity::MarkovSwitching(r) | Heteroskedasticity::Mixture(r) => {
                Some(r.n_variables())
            }
            Heteroskedasticity::StochasticVolatility(sv) => Some(sv.n_variables()),
            Heteroskedasticity::Homoskedastic | Heteroskedasticity::StudentT(_) => None,
        }
    }

    /// Forecast the `N × H` variance block of posterior draw `s`.
    ///
    /// Parameters
    /// ----------
    /// - `s`: `usize`
    ///   Posterior draw index; must be `< n_draws()` for non-homoskedastic
    ///   variants.
    /// - `n`: `usize`
    ///   Number of variables N (used for the broadcast variants).
    /// - `horizon`: `usize`
    ///   Number of forecast steps H ≥ 1.
    /// - `rng`: `&mut R`
    ///   Per-draw generator. Untouched by the homoskedastic and regime
    ///   variants.
    ///
    /// Returns
    /// -------
    /// `ForecastResult<Array2<f64>>`
    ///   Variances with `out[[i, h]] = Var(u_{i, T+h+1})`.
    ///
    /// Errors
    /// ------
    /// - `ForecastError::NonFiniteVolatility` if a variance overflows,
    ///   underflows to zero, or is NaN.
    /// - `ForecastError::InvalidParameter` if the χ² sampler rejects ν.
    ///
    /// Panics
    /// ------
    /// - If `s` is out of range for the variant's posterior arrays.
    pub fn forecast_volatility<R: Rng + ?Sized>(
        &self, s: usize, n: usize, horizon: usize, rng: &mut R,
    ) -> ForecastResult<Array2<f64>> {
        let paths = match self {
            Heteroskedasticity::Homoskedastic => Array2::ones((n, horizon)),
            Heteroskedasticity::MarkovSwitching(regimes) | Heteroskedasticity::Mixture(regimes) => {
                regime_mixture_path(regimes, s, horizon)
            }
            Heteroskedasticity::StochasticVolatility(sv) => sv_path(sv, s, horizon, rng),
            Heteroskedasticity::StudentT(t) => student_t_path(t, s, n, horizon, rng)?,
        };
        check_volatility(&paths, s)?;
        Ok(paths)
    }
}

// ---- Per-variant recursions ----

/// Closed-form regime mixture: `π_h = P_sᵀ π_{h−1}`, `σ²_h = Σ_m π_h[m] σ²[·, m]`.
fn regime_mixture_path(regimes: &RegimeDraws, s: usize, horizon: usize) -> Array2<f64> {
    let variances = regimes.variances(s);
    let transition = regimes.transition(s);
    let mut probs: Array1<f64> = regimes.terminal(s).to_owned();
    let mut out = Array2::<f64>::zeros((regimes.n_variables(), horizon));
    for h in 0..horizon {
        probs = transition.t().dot(&probs);
        out.column_mut(h).assign(&variances.dot(&probs));
    }
    out
}

fn sv_path<R: Rng + ?Sized>(sv: &SVDraws, s: usize, horizon: usize, rng: &mut R) -> Array2<f64> {
    let g = sv.persistence(s);
    let scale = sv.scale(s);
    let mut log_vol: Array1<f64> = sv.terminal_log_volatility(s).to_owned();
    let mut out = Array2::<f64>::zeros((sv.n_variables(), horizon));
    for h in 0..horizon {
        for i in 0..log_vol.len() {
            let z: f64 = StandardNormal.sample(rng);
            out[[i, h]] = match sv.parameterization() {
                SVParameterization::NonCentred => {
                    log_vol[i] = g[i] * log_vol[i] + z;
                    (scale[i] * log_vol[i]).exp()
                }
                SVParameterization::Centred => {
                    log_vol[i] = g[i] * log_vol[i] + scale[i].sqrt() * z;
                    log_vol[i].exp()
                }
            };
        }
    }
    out
}

fn student_t_path<R: Rng + ?Sized>(
    t: &StudentTDraws, s: usize, n: usize, horizon: usize, rng: &mut R,
) -> ForecastResult<Array2<f64>> {
    let nu = t.degrees_of_freedom(s);
    let chi2 = ChiSquared::new(nu).map_err(|_| ForecastError::InvalidParameter {
        what: "degrees of freedom",
        draw: s,
        value: nu,
        reason: "rejected by the chi-square sampler",
    })?;
    let mut out = Array2::<f64>::zeros((n, horizon));
    for h in 0..horizon {
        let lambda = nu / chi2.sample(rng);
        out.column_mut(h).fill(lambda);
    }
    Ok(out)
}

fn check_volatility(paths: &Array2<f64>, s: usize) -> ForecastResult<()> {
    if let Some(((_, horizon), &value)) =
        paths.indexed_iter().find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        return Err(ForecastError::NonFiniteVolatility { draw: s, horizon, value });
    }
    Ok(())
}
