use std::f64::consts::PI;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use super::saturation_sector;
use crate::traits::{AnalyticDescribingFunction, Nonlinearity, StatefulNonlinearity};

/// Backlash (dead-band follower) of total width `b`.
///
/// The output is the position of a follower centred in a gap of half-width
/// `b/2`; it only moves when the input pushes against either edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backlash {
    b: f64,
    center: f64,
}

impl Backlash {
    /// Starts centred at zero.
    pub fn new(b: f64) -> Self {
        Self { b, center: 0.0 }
    }

    pub fn width(&self) -> f64 {
        self.b
    }
}

impl StatefulNonlinearity for Backlash {
    type State = f64;

    fn state(&self) -> f64 {
        self.center
    }

    fn transition(&self, center: f64, input: f64) -> (f64, f64) {
        let half = self.b / 2.0;
        let next = if input - center > half {
            input - half
        } else if input - center < -half {
            input + half
        } else {
            center
        };
        (next, next)
    }
}

impl Nonlinearity for Backlash {
    fn evaluate(&mut self, x: f64) -> f64 {
        let (center, y) = self.transition(self.center, x);
        self.center = center;
        y
    }

    fn analytic(&self) -> Option<&dyn AnalyticDescribingFunction> {
        Some(self)
    }
}

impl AnalyticDescribingFunction for Backlash {
    fn describing_function(&self, amplitude: f64) -> Complex<f64> {
        // Output never leaves the dead band.
        if amplitude <= self.b / 2.0 {
            return Complex::new(0.0, 0.0);
        }
        let ratio = self.b / amplitude;
        let re = (1.0 + saturation_sector(1.0 - ratio)) / 2.0;
        let im = -(2.0 * ratio - ratio * ratio) / PI;
        Complex::new(re, im)
    }
}
