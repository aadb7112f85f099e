//! Static nonlinearities used in describing-function analysis.
//!
//! Built-in variants carry closed-form describing functions:
//! - [`Saturation`]: stateless clamp.
//! - [`RelayHysteresis`]: two-branch relay with switching memory.
//! - [`Backlash`]: dead-band follower with a moving center.
//!
//! Arbitrary user functions are wrapped with [`ScalarFunction`] and can only
//! be analysed numerically.

mod backlash;
mod relay;
mod saturation;

pub use backlash::Backlash;
pub use relay::{RelayBranch, RelayHysteresis};
pub use saturation::Saturation;

use std::f64::consts::PI;

use crate::diagnostics::Diagnostic;
use crate::error::{DescribingFunctionError, Result};
use crate::traits::{AnalyticDescribingFunction, Nonlinearity};

/// Wraps a plain callable as a numeric-only nonlinearity.
pub struct ScalarFunction<F> {
    func: F,
}

impl<F: FnMut(f64) -> f64> ScalarFunction<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F: FnMut(f64) -> f64> Nonlinearity for ScalarFunction<F> {
    fn evaluate(&mut self, x: f64) -> f64 {
        (self.func)(x)
    }
}

impl<N: Nonlinearity + ?Sized> Nonlinearity for Box<N> {
    fn evaluate(&mut self, x: f64) -> f64 {
        (**self).evaluate(x)
    }

    fn evaluate_slice(&mut self, input: &[f64], out: &mut [f64]) {
        (**self).evaluate_slice(input, out)
    }

    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        (**self).analytic()
    }

    fn diagnostics(&self) -> &[Diagnostic] {
        (**self).diagnostics()
    }
}

/// Sector function of a unit saturation:
/// `sign(z)` for `|z| > 1`, `(asin z + z sqrt(1 - z^2)) 2/pi` otherwise.
pub fn saturation_sector(z: f64) -> f64 {
    if z.abs() > 1.0 {
        1.0_f64.copysign(z)
    } else {
        (z.asin() + z * (1.0 - z * z).sqrt()) * 2.0 / PI
    }
}

/// Sector bounds `(k1, k2)` of a nonlinearity, for circle-criterion analysis.
///
/// Not implemented for any nonlinearity; always fails.
pub fn sector_bounds<N: Nonlinearity + ?Sized>(_nonlinearity: &N) -> Result<(f64, f64)> {
    Err(DescribingFunctionError::SectorBoundsUnimplemented)
}

#[cfg(test)]
mod tests {
    use super::{saturation_sector, sector_bounds, Saturation, ScalarFunction};
    use crate::error::DescribingFunctionError;
    use crate::traits::Nonlinearity;

    #[test]
    fn saturation_sector_limits_and_midpoint() {
        assert_eq!(saturation_sector(2.0), 1.0);
        assert_eq!(saturation_sector(-2.0), -1.0);
        assert_eq!(saturation_sector(0.0), 0.0);
        assert!((saturation_sector(1.0) - 1.0).abs() < 1e-12);
        assert!((saturation_sector(-1.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn saturation_sector_is_odd_and_increasing() {
        let mut previous = -1.0;
        for k in -9..=9 {
            let z = k as f64 / 10.0;
            let value = saturation_sector(z);
            assert!((value + saturation_sector(-z)).abs() < 1e-12);
            assert!(value > previous);
            previous = value;
        }
    }

    #[test]
    fn scalar_function_is_numeric_only() {
        let mut cubic = ScalarFunction::new(|x: f64| x * x * x);
        assert_eq!(cubic.evaluate(2.0), 8.0);
        assert!(cubic.analytic().is_none());
    }

    #[test]
    fn evaluate_slice_runs_in_order() {
        let mut calls = Vec::new();
        let mut recorder = ScalarFunction::new(|x: f64| {
            calls.push(x);
            -x
        });
        let mut out = [0.0; 3];
        recorder.evaluate_slice(&[1.0, 2.0, 3.0], &mut out);
        assert_eq!(out, [-1.0, -2.0, -3.0]);
        drop(recorder);
        assert_eq!(calls, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn boxed_nonlinearity_keeps_capability() {
        let boxed: Box<dyn Nonlinearity> = Box::new(Saturation::symmetric(1.0));
        assert!(boxed.analytic().is_some());
    }

    #[test]
    fn sector_bounds_is_unimplemented() {
        let sat = Saturation::symmetric(1.0);
        assert_eq!(
            sector_bounds(&sat),
            Err(DescribingFunctionError::SectorBoundsUnimplemented)
        );
    }
}
