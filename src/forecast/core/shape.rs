//! Model dimensions for SVAR forecasting.
//!
//! The regressor vector of period t is laid out as
//! `x_t = (y_{t−1}, …, y_{t−p}, 1, z_t)`:
//! - `n`: number of endogenous variables (length of each `y` block).
//! - `p`: lag order (number of `y` blocks).
//! - `constant`: whether the intercept entry `1` is present.
//! - `d`: number of exogenous regressors `z_t`.
//!
//! so that `K = n·p + constant + d`.
use crate::forecast::errors::{ForecastError, ForecastResult};

/// Dimensions of an SVAR(p) with optional intercept and `d` exogenous regressors.
///
/// Invariants: `n ≥ 1`, `p ≥ 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SVARShape {
    pub n: usize,
    pub p: usize,
    pub d: usize,
    pub constant: bool,
}

impl SVARShape {
    /// Construct an [`SVARShape`] and validate it.
    ///
    /// # Arguments
    /// - `n`: number of endogenous variables.
    /// - `p`: lag order.
    /// - `d`: number of exogenous regressors (may be zero).
    /// - `constant`: whether the regressor vector carries an intercept.
    ///
    /// # Errors
    /// - [`ForecastError::ShapeMismatch`] if `n == 0`.
    /// - [`ForecastError::InvalidLagOrder`] if `p == 0`.
    pub fn new(n: usize, p: usize, d: usize, constant: bool) -> ForecastResult<Self> {
        let shape = SVARShape { n, p, d, constant };
        shape.validate()?;
        Ok(shape)
    }

    /// Re-check the invariants of a shape that may have been built as a
    /// struct literal.
    ///
    /// # Errors
    /// Same as [`SVARShape::new`].
    pub fn validate(&self) -> ForecastResult<()> {
        if self.n == 0 {
            return Err(ForecastError::ShapeMismatch {
                what: "number of variables",
                expected: vec![1],
                actual: vec![0],
            });
        }
        if self.p == 0 {
            return Err(ForecastError::InvalidLagOrder { p: self.p });
        }
        Ok(())
    }

    /// Length `K` of the regressor vector.
    pub fn k(&self) -> usize {
        self.n * self.p + usize::from(self.constant) + self.d
    }

    /// Offset of the first exogenous entry in the regressor vector.
    pub fn exogenous_offset(&self) -> usize {
        self.n * self.p + usize::from(self.constant)
    }
}
